use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use skylane_core::availability::{available_seats, fits};
use skylane_core::models::{
    Airport, Booking, BookingLeg, Carrier, Leg, Passenger, Person, Reservation, Route,
    FLIGHT_NUMBER_CEILING,
};
use skylane_core::repository::{InventoryStore, NewBooking};
use skylane_core::{Error, Result};

/// Postgres-backed inventory store.
///
/// Sequence allocation rides on a single-row counter updated with
/// `UPDATE .. RETURNING`; reservations take a row lock on their leg so the
/// availability check and the insert commit as one unit; booking creation is
/// a single SQL transaction.
pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn internal(err: sqlx::Error) -> Error {
    Error::Internal(err.to_string())
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct CarrierRow {
    id: Uuid,
    iata: String,
    name: String,
}

impl From<CarrierRow> for Carrier {
    fn from(row: CarrierRow) -> Self {
        Carrier { id: row.id, iata: row.iata, name: row.name }
    }
}

#[derive(sqlx::FromRow)]
struct AirportRow {
    id: Uuid,
    iata: String,
    name: String,
    time_zone: String,
}

impl From<AirportRow> for Airport {
    fn from(row: AirportRow) -> Self {
        Airport { id: row.id, iata: row.iata, name: row.name, time_zone: row.time_zone }
    }
}

#[derive(sqlx::FromRow)]
struct RouteRow {
    id: Uuid,
    carrier_id: Uuid,
    departure_airport_id: Uuid,
    arrival_airport_id: Uuid,
    weekday: i16,
    departure_second_in_day: i32,
    duration_in_seconds: i32,
    number_of_seats: i32,
    seat_price: i64,
}

impl From<RouteRow> for Route {
    fn from(row: RouteRow) -> Self {
        Route {
            id: row.id,
            carrier_id: row.carrier_id,
            departure_airport_id: row.departure_airport_id,
            arrival_airport_id: row.arrival_airport_id,
            weekday: row.weekday as u8,
            departure_second_in_day: row.departure_second_in_day as u32,
            duration_in_seconds: row.duration_in_seconds as u32,
            number_of_seats: row.number_of_seats as u32,
            seat_price: row.seat_price,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LegRow {
    id: Uuid,
    route_id: Uuid,
    week: i32,
    year: i32,
    sequence_id: i32,
}

impl From<LegRow> for Leg {
    fn from(row: LegRow) -> Self {
        Leg {
            id: row.id,
            route_id: row.route_id,
            week: row.week as u32,
            year: row.year,
            sequence_id: row.sequence_id as u32,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    leg_id: Uuid,
    amount_of_seats: i32,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Reservation {
            id: row.id,
            leg_id: row.leg_id,
            amount_of_seats: row.amount_of_seats as u32,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    credit_card_number: String,
    frequent_flyer_id: Option<String>,
}

#[derive(sqlx::FromRow)]
struct BookingLegRow {
    id: Uuid,
    leg_id: Uuid,
}

#[derive(sqlx::FromRow)]
struct PassengerRow {
    pnr: String,
    first_name: String,
    last_name: String,
    agency: Option<String>,
}

const SELECT_LEG: &str = "SELECT id, route_id, week, year, sequence_id FROM legs";

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn carrier_by_iata(&self, iata: &str) -> Result<Option<Carrier>> {
        let row: Option<CarrierRow> =
            sqlx::query_as("SELECT id, iata, name FROM carriers WHERE iata = $1")
                .bind(iata)
                .fetch_optional(&self.pool)
                .await
                .map_err(internal)?;
        Ok(row.map(Into::into))
    }

    async fn airport_by_iata(&self, iata: &str) -> Result<Option<Airport>> {
        let row: Option<AirportRow> =
            sqlx::query_as("SELECT id, iata, name, time_zone FROM airports WHERE iata = $1")
                .bind(iata)
                .fetch_optional(&self.pool)
                .await
                .map_err(internal)?;
        Ok(row.map(Into::into))
    }

    async fn carrier(&self, id: Uuid) -> Result<Option<Carrier>> {
        let row: Option<CarrierRow> =
            sqlx::query_as("SELECT id, iata, name FROM carriers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(internal)?;
        Ok(row.map(Into::into))
    }

    async fn airport(&self, id: Uuid) -> Result<Option<Airport>> {
        let row: Option<AirportRow> =
            sqlx::query_as("SELECT id, iata, name, time_zone FROM airports WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(internal)?;
        Ok(row.map(Into::into))
    }

    async fn route(&self, id: Uuid) -> Result<Option<Route>> {
        let row: Option<RouteRow> = sqlx::query_as(
            "SELECT id, carrier_id, departure_airport_id, arrival_airport_id, weekday, \
             departure_second_in_day, duration_in_seconds, number_of_seats, seat_price \
             FROM routes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        Ok(row.map(Into::into))
    }

    async fn routes_between(
        &self,
        departure_airport_id: Uuid,
        arrival_airport_id: Uuid,
        weekday: u8,
    ) -> Result<Vec<Route>> {
        let rows: Vec<RouteRow> = sqlx::query_as(
            "SELECT id, carrier_id, departure_airport_id, arrival_airport_id, weekday, \
             departure_second_in_day, duration_in_seconds, number_of_seats, seat_price \
             FROM routes \
             WHERE departure_airport_id = $1 AND arrival_airport_id = $2 AND weekday = $3",
        )
        .bind(departure_airport_id)
        .bind(arrival_airport_id)
        .bind(i16::from(weekday))
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn leg(&self, id: Uuid) -> Result<Option<Leg>> {
        let row: Option<LegRow> = sqlx::query_as(&format!("{SELECT_LEG} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?;
        Ok(row.map(Into::into))
    }

    async fn leg_for_route(&self, route_id: Uuid, week: u32, year: i32) -> Result<Option<Leg>> {
        let row: Option<LegRow> = sqlx::query_as(&format!(
            "{SELECT_LEG} WHERE route_id = $1 AND week = $2 AND year = $3"
        ))
        .bind(route_id)
        .bind(week as i32)
        .bind(year)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        Ok(row.map(Into::into))
    }

    async fn leg_by_sequence(&self, sequence_id: u32) -> Result<Option<Leg>> {
        let row: Option<LegRow> = sqlx::query_as(&format!(
            "{SELECT_LEG} WHERE sequence_id = $1 ORDER BY created_at LIMIT 1"
        ))
        .bind(sequence_id as i32)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        Ok(row.map(Into::into))
    }

    async fn insert_leg(&self, route_id: Uuid, week: u32, year: i32) -> Result<Leg> {
        let mut tx = self.pool.begin().await.map_err(internal)?;

        let sequence_id: i32 = sqlx::query_scalar(
            "UPDATE leg_sequence \
             SET value = CASE WHEN value >= $1 THEN 1 ELSE value + 1 END \
             WHERE name = 'legs' RETURNING value",
        )
        .bind(FLIGHT_NUMBER_CEILING as i32)
        .fetch_one(&mut *tx)
        .await
        .map_err(internal)?;

        let inserted: Option<LegRow> = sqlx::query_as(
            "INSERT INTO legs (id, route_id, week, year, sequence_id) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (route_id, week, year) DO NOTHING \
             RETURNING id, route_id, week, year, sequence_id",
        )
        .bind(Uuid::new_v4())
        .bind(route_id)
        .bind(week as i32)
        .bind(year)
        .bind(sequence_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(internal)?;

        match inserted {
            Some(row) => {
                tx.commit().await.map_err(internal)?;
                Ok(row.into())
            }
            None => {
                // Lost the create race; roll back so the counter increment is
                // returned along with the aborted insert, and hand back the
                // winner's row.
                tx.rollback().await.map_err(internal)?;
                self.leg_for_route(route_id, week, year)
                    .await?
                    .ok_or_else(|| Error::Internal("Leg vanished after insert conflict".to_string()))
            }
        }
    }

    async fn seats_booked(&self, leg_id: Uuid) -> Result<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(p.id) FROM passengers p \
             JOIN booking_legs bl ON p.booking_leg_id = bl.id \
             WHERE bl.leg_id = $1",
        )
        .bind(leg_id)
        .fetch_one(&self.pool)
        .await
        .map_err(internal)?;
        Ok(count as u32)
    }

    async fn seats_held(&self, leg_id: Uuid) -> Result<u32> {
        let held: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_of_seats), 0) FROM reservations WHERE leg_id = $1",
        )
        .bind(leg_id)
        .fetch_one(&self.pool)
        .await
        .map_err(internal)?;
        Ok(held as u32)
    }

    async fn create_reservation(&self, leg_id: Uuid, amount_of_seats: u32) -> Result<Reservation> {
        let mut tx = self.pool.begin().await.map_err(internal)?;

        // Row lock on the leg serializes concurrent reservations for the same
        // flight; the seat sums below are then stable until commit.
        let capacity: Option<i32> = sqlx::query_scalar(
            "SELECT r.number_of_seats FROM legs l \
             JOIN routes r ON l.route_id = r.id \
             WHERE l.id = $1 FOR UPDATE OF l",
        )
        .bind(leg_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(internal)?;

        let capacity = match capacity {
            Some(capacity) => capacity as u32,
            None => return Err(Error::NotFound("Could not find flight".to_string())),
        };

        let booked: i64 = sqlx::query_scalar(
            "SELECT COUNT(p.id) FROM passengers p \
             JOIN booking_legs bl ON p.booking_leg_id = bl.id \
             WHERE bl.leg_id = $1",
        )
        .bind(leg_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(internal)?;

        let held: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount_of_seats), 0) FROM reservations WHERE leg_id = $1",
        )
        .bind(leg_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(internal)?;

        let available = available_seats(capacity, booked as u32, held as u32);
        if !fits(available, amount_of_seats) {
            tx.rollback().await.map_err(internal)?;
            return Err(Error::Reservation(
                "There are not enough seats left for this reservation".to_string(),
            ));
        }

        let row: ReservationRow = sqlx::query_as(
            "INSERT INTO reservations (id, leg_id, amount_of_seats) \
             VALUES ($1, $2, $3) RETURNING id, leg_id, amount_of_seats",
        )
        .bind(Uuid::new_v4())
        .bind(leg_id)
        .bind(amount_of_seats as i32)
        .fetch_one(&mut *tx)
        .await
        .map_err(internal)?;

        tx.commit().await.map_err(internal)?;
        Ok(row.into())
    }

    async fn reservation(&self, id: Uuid) -> Result<Option<Reservation>> {
        let row: Option<ReservationRow> = sqlx::query_as(
            "SELECT id, leg_id, amount_of_seats FROM reservations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;
        Ok(row.map(Into::into))
    }

    async fn commit_booking(&self, new_booking: NewBooking) -> Result<Uuid> {
        let mut tx = self.pool.begin().await.map_err(internal)?;

        for reservation_id in &new_booking.consumed_reservations {
            let deleted = sqlx::query("DELETE FROM reservations WHERE id = $1")
                .bind(reservation_id)
                .execute(&mut *tx)
                .await
                .map_err(internal)?;
            if deleted.rows_affected() == 0 {
                tx.rollback().await.map_err(internal)?;
                return Err(Error::NotFound("Could not find reservation".to_string()));
            }
        }

        let booking_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO bookings (id, credit_card_number, frequent_flyer_id) \
             VALUES ($1, $2, $3)",
        )
        .bind(booking_id)
        .bind(&new_booking.credit_card_number)
        .bind(&new_booking.frequent_flyer_id)
        .execute(&mut *tx)
        .await
        .map_err(internal)?;

        for (position, booking_leg) in new_booking.booking_legs.iter().enumerate() {
            let booking_leg_id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO booking_legs (id, booking_id, leg_id, position) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(booking_leg_id)
            .bind(booking_id)
            .bind(booking_leg.leg_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(internal)?;

            for (ordinal, passenger) in booking_leg.passengers.iter().enumerate() {
                // A record locator collision trips the unique constraint here
                // and aborts the whole transaction.
                sqlx::query(
                    "INSERT INTO passengers \
                     (id, booking_leg_id, ordinal, pnr, first_name, last_name, agency) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7)",
                )
                .bind(Uuid::new_v4())
                .bind(booking_leg_id)
                .bind(ordinal as i32)
                .bind(&passenger.pnr)
                .bind(&passenger.person.first_name)
                .bind(&passenger.person.last_name)
                .bind(&passenger.person.agency)
                .execute(&mut *tx)
                .await
                .map_err(internal)?;
            }
        }

        tx.commit().await.map_err(internal)?;
        Ok(booking_id)
    }

    async fn booking(&self, id: Uuid) -> Result<Option<Booking>> {
        let row: Option<BookingRow> = sqlx::query_as(
            "SELECT id, credit_card_number, frequent_flyer_id FROM bookings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let leg_rows: Vec<BookingLegRow> = sqlx::query_as(
            "SELECT id, leg_id FROM booking_legs WHERE booking_id = $1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(internal)?;

        let mut booking_legs = Vec::with_capacity(leg_rows.len());
        for leg_row in leg_rows {
            let passenger_rows: Vec<PassengerRow> = sqlx::query_as(
                "SELECT pnr, first_name, last_name, agency FROM passengers \
                 WHERE booking_leg_id = $1 ORDER BY ordinal",
            )
            .bind(leg_row.id)
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;

            let passengers = passenger_rows
                .into_iter()
                .map(|p| Passenger {
                    pnr: p.pnr,
                    person: Person {
                        first_name: p.first_name,
                        last_name: p.last_name,
                        agency: p.agency,
                    },
                })
                .collect();

            booking_legs.push(BookingLeg { leg_id: leg_row.leg_id, passengers });
        }

        Ok(Some(Booking {
            id: row.id,
            booking_legs,
            credit_card_number: row.credit_card_number,
            frequent_flyer_id: row.frequent_flyer_id,
        }))
    }

    async fn booking_by_pnr(&self, pnr: &str) -> Result<Option<Booking>> {
        let booking_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT bl.booking_id FROM booking_legs bl \
             JOIN passengers p ON p.booking_leg_id = bl.id \
             WHERE p.pnr = $1",
        )
        .bind(pnr)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        match booking_id {
            Some(booking_id) => self.booking(booking_id).await,
            None => Ok(None),
        }
    }

    async fn delete_booking(&self, id: Uuid) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
        Ok(deleted.rows_affected() > 0)
    }
}
