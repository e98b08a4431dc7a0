//! Wall-clock derivation of departure and arrival instants.
//!
//! Routes carry their schedule in local terms: a weekday, a second-of-day in
//! the departure airport's zone and a duration. Instants are derived by
//! resolving local midnight of the target date in the departure zone and
//! adding the offsets in absolute time; re-expressing the arrival in the
//! arrival airport's zone never changes the instant itself.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::models::Route;
use crate::{Error, Result};

/// Resolve an IANA zone name as carried on an airport record.
pub fn zone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| Error::Internal(format!("Unknown time zone: {name}")))
}

/// Map a stored weekday index (0 = Sunday .. 6 = Saturday) to a weekday.
pub fn weekday_from_index(index: u8) -> Result<Weekday> {
    let weekday = match index {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        _ => return Err(Error::Internal(format!("Invalid weekday index: {index}"))),
    };
    Ok(weekday)
}

/// Calendar date of a route's weekday within the given ISO week. Sunday maps
/// to ISO day 7, the last day of the week.
pub fn leg_date(week: u32, year: i32, weekday_index: u8) -> Result<NaiveDate> {
    let weekday = weekday_from_index(weekday_index)?;
    NaiveDate::from_isoywd_opt(year, week, weekday)
        .ok_or_else(|| Error::Internal(format!("Invalid ISO week {week} of {year}")))
}

fn local_midnight(date: NaiveDate, zone: Tz) -> Result<DateTime<Utc>> {
    let naive = date.and_time(NaiveTime::MIN);
    let local = match zone.from_local_datetime(&naive) {
        LocalResult::Single(instant) => instant,
        LocalResult::Ambiguous(earliest, _) => earliest,
        // Midnight skipped by a DST transition; the hour after the gap is the
        // first valid local instant of the day.
        LocalResult::None => zone
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .ok_or_else(|| {
                Error::Internal(format!("No valid local midnight on {date} in {zone}"))
            })?,
    };
    Ok(local.with_timezone(&Utc))
}

/// Departure instant of a route on a concrete calendar date in the departure
/// airport's zone.
pub fn departure_instant(
    date: NaiveDate,
    departure_second_in_day: u32,
    departure_zone: Tz,
) -> Result<DateTime<Utc>> {
    let midnight = local_midnight(date, departure_zone)?;
    Ok(midnight + Duration::seconds(i64::from(departure_second_in_day)))
}

/// Departure and arrival instants for a route flying on `date`, as epoch
/// milliseconds. The arrival is the departure plus the flight duration in
/// absolute time.
pub fn flight_times(route: &Route, date: NaiveDate, departure_zone: Tz) -> Result<(i64, i64)> {
    let departure = departure_instant(date, route.departure_second_in_day, departure_zone)?;
    let arrival = departure + Duration::seconds(i64::from(route.duration_in_seconds));
    Ok((departure.timestamp_millis(), arrival.timestamp_millis()))
}
