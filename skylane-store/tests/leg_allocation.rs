mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::*;
use skylane_core::legs::resolve_leg;
use skylane_core::InventoryStore;

#[tokio::test]
async fn test_resolution_is_idempotent() {
    let fixture = fixture().await;
    let route_id = fixture.sk_route.id;

    let first = resolve_leg(fixture.store.as_ref(), route_id, 50, 2020)
        .await
        .unwrap();
    let second = resolve_leg(fixture.store.as_ref(), route_id, 50, 2020)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.sequence_id, second.sequence_id);
    assert_eq!(first.padded_id(), second.padded_id());
}

#[tokio::test]
async fn test_each_key_gets_its_own_sequence_number() {
    let fixture = fixture().await;

    // SK001 and FR002 exist from the fixture; later weeks continue from 3.
    let week_50 = resolve_leg(fixture.store.as_ref(), fixture.sk_route.id, 50, 2020)
        .await
        .unwrap();
    let week_51 = resolve_leg(fixture.store.as_ref(), fixture.sk_route.id, 51, 2020)
        .await
        .unwrap();

    assert_eq!(week_50.padded_id(), "003");
    assert_eq!(week_51.padded_id(), "004");
}

#[tokio::test]
async fn test_concurrent_resolution_never_assigns_a_number_twice() {
    let fixture = fixture().await;
    let store = Arc::clone(&fixture.store);

    let mut handles = Vec::new();
    for week in 10..30 {
        let store = Arc::clone(&store);
        let route_id = fixture.fr_route.id;
        handles.push(tokio::spawn(async move {
            resolve_leg(store.as_ref(), route_id, week, 2021).await
        }));
    }

    let mut sequences = HashSet::new();
    for handle in handles {
        let leg = handle.await.unwrap().unwrap();
        assert!(
            sequences.insert(leg.sequence_id),
            "sequence {} assigned twice",
            leg.sequence_id
        );
    }
    assert_eq!(sequences.len(), 20);
}

#[tokio::test]
async fn test_resolved_leg_is_reservable_by_its_flight_code() {
    let fixture = fixture().await;

    let leg = resolve_leg(fixture.store.as_ref(), fixture.fr_route.id, 50, 2020)
        .await
        .unwrap();
    let flight_code = format!("FR{}", leg.padded_id());

    let summary = fixture
        .service
        .reserve_flight(&flight_code, 2)
        .await
        .unwrap();
    assert_eq!(summary.price, 138);

    let held = fixture.store.seats_held(leg.id).await.unwrap();
    assert_eq!(held, 2);
}
