//! Integration tests for the registry actor.
//!
//! These exercise `spawn_registry()` and `RegistryHandle` as a complete
//! system, including many clones of the handle racing each other.
//!
//! Tests may use `.unwrap()` and `.expect()`.

use std::collections::HashSet;
use std::time::Duration;

use cruise_core::{Money, Passenger, PassengerType, ShipError, CABIN_COUNT};
use cruise_protocol::ShipChange;
use cruised::registry::{spawn_registry, RegistryError, RegistryHandle};
use tokio::time::timeout;

// ============================================================================
// Test Helpers
// ============================================================================

fn adult(first: &str, surname: &str) -> Passenger {
    Passenger::new(first, surname, PassengerType::Adult)
}

async fn fill_ship(handle: &RegistryHandle) {
    for n in 0..CABIN_COUNT as i64 {
        handle
            .assign_passengers(n, format!("Party {n}"), vec![adult("Sam", "Guest")])
            .await
            .expect("assignment should succeed");
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_fresh_registry_is_empty() {
    let handle = spawn_registry();

    let cabins = handle.get_all_cabins().await.unwrap();
    assert_eq!(cabins.len(), CABIN_COUNT);
    assert!(cabins.iter().all(|c| !c.is_occupied() && c.passengers().is_empty()));
    assert!(handle.get_waiting_list().await.unwrap().is_empty());
    assert!(handle.total_expenses().await.unwrap().is_zero());
    assert!(handle.is_connected());
}

#[tokio::test]
async fn test_smith_family_scenario() {
    let handle = spawn_registry();

    let cabin = handle
        .assign_passengers(3, "Smith Family".to_string(), vec![adult("Ann", "Smith")])
        .await
        .unwrap();
    assert!(cabin.is_occupied());

    let found = handle.find_cabins("Smith".to_string()).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].number().get(), 3);
}

#[tokio::test]
async fn test_jones_backfill_scenario() {
    let handle = spawn_registry();
    fill_ship(&handle).await;

    assert_eq!(handle.add_to_waiting_list("Jones".to_string()).await.unwrap(), 1);
    assert_eq!(handle.get_waiting_list().await.unwrap(), vec!["Jones"]);

    let outcome = handle.vacate_cabin(3).await.unwrap();
    assert_eq!(outcome.next_waiting_guest.as_deref(), Some("Jones"));
    assert!(handle.get_waiting_list().await.unwrap().is_empty());
    assert!(!handle.get_cabin(3).await.unwrap().is_occupied());

    // Caller seats the guest explicitly
    handle
        .assign_passengers(3, "Jones".to_string(), vec![adult("Pat", "Jones")])
        .await
        .unwrap();
    assert!(handle.get_cabin(3).await.unwrap().is_occupied());
}

#[tokio::test]
async fn test_waiting_list_gated_on_full_ship() {
    let handle = spawn_registry();
    handle
        .assign_passengers(0, "Solo".to_string(), vec![adult("Kim", "Lee")])
        .await
        .unwrap();

    let err = handle.add_to_waiting_list("Jones".to_string()).await.unwrap_err();
    assert_eq!(err, RegistryError::Ship(ShipError::ShipNotFull { vacant: 11 }));
    assert!(handle.get_waiting_list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_vacate_empty_cabin_changes_nothing() {
    let handle = spawn_registry();
    fill_ship(&handle).await;
    handle.add_to_waiting_list("Jones".to_string()).await.unwrap();
    handle.vacate_cabin(4).await.unwrap();

    let err = handle.vacate_cabin(4).await.unwrap_err();
    assert_eq!(err, RegistryError::Ship(ShipError::CabinAlreadyEmpty { cabin_number: 4 }));
    assert_eq!(err.code(), "cabin_already_empty");
}

#[tokio::test]
async fn test_charges_roll_up() {
    let handle = spawn_registry();
    handle
        .assign_passengers(1, "Browns".to_string(), vec![adult("Zoe", "Brown"), adult("Al", "Brown")])
        .await
        .unwrap();

    handle.charge_expense(1, 0, Money::from_dollars(10.0)).await.unwrap();
    let total = handle.charge_expense(1, 0, Money::from_dollars(2.5)).await.unwrap();
    assert_eq!(total, Money::from_dollars(12.5));
    handle.charge_expense(1, 1, Money::from_dollars(7.5)).await.unwrap();

    assert_eq!(handle.total_expenses().await.unwrap(), Money::from_dollars(20.0));

    let err = handle.charge_expense(1, 5, Money::from_dollars(1.0)).await.unwrap_err();
    assert_eq!(err.code(), "validation");

    let roster = handle.ordered_passengers().await.unwrap();
    assert_eq!(roster[0].first_name, "Al");
    assert_eq!(roster[1].first_name, "Zoe");
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_assigns_single_winner() {
    let handle = spawn_registry();

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let handle = handle.clone();
            tokio::spawn(async move {
                handle
                    .assign_passengers(
                        6,
                        format!("Party {i}"),
                        vec![adult("Sam", &format!("Guest{i}"))],
                    )
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => winners += 1,
            Err(e) => assert_eq!(e, RegistryError::Ship(ShipError::CabinOccupied { cabin_number: 6 })),
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_vacates_pop_distinct_guests() {
    let handle = spawn_registry();
    fill_ship(&handle).await;

    let guests = ["Ava", "Ben", "Cal", "Dee", "Eve"];
    for guest in guests {
        handle.add_to_waiting_list(guest.to_string()).await.unwrap();
    }

    let tasks: Vec<_> = (0..CABIN_COUNT as i64)
        .map(|n| {
            let handle = handle.clone();
            tokio::spawn(async move { handle.vacate_cabin(n).await })
        })
        .collect();

    let mut popped = Vec::new();
    for task in tasks {
        let outcome = task.await.unwrap().unwrap();
        if let Some(guest) = outcome.next_waiting_guest {
            popped.push(guest);
        }
    }

    assert_eq!(popped.len(), guests.len());
    let unique: HashSet<&String> = popped.iter().collect();
    assert_eq!(unique.len(), guests.len());
    assert!(handle.get_waiting_list().await.unwrap().is_empty());
}

// ============================================================================
// Events
// ============================================================================

#[tokio::test]
async fn test_events_follow_mutations() {
    let handle = spawn_registry();
    let mut events = handle.subscribe();

    handle
        .assign_passengers(2, "Smiths".to_string(), vec![adult("Ann", "Smith")])
        .await
        .unwrap();
    handle.vacate_cabin(2).await.unwrap();
    // Rejected; publishes nothing
    let _ = handle.vacate_cabin(2).await;
    handle.load_snapshot(handle.get_all_cabins().await.unwrap()).await.unwrap();

    let mut changes = Vec::new();
    for _ in 0..3 {
        let event = timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("event within timeout")
            .unwrap();
        changes.push(event.change);
    }

    assert_eq!(
        changes,
        vec![
            ShipChange::CabinAssigned { cabin_number: 2 },
            ShipChange::CabinVacated {
                cabin_number: 2,
                next_waiting_guest: None
            },
            ShipChange::SnapshotLoaded,
        ]
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_failed_snapshot_keeps_state() {
    let handle = spawn_registry();
    handle
        .assign_passengers(9, "Lees".to_string(), vec![adult("Kim", "Lee")])
        .await
        .unwrap();

    let mut cabins = handle.get_all_cabins().await.unwrap();
    cabins.pop();
    let err = handle.load_snapshot(cabins).await.unwrap_err();
    assert_eq!(err.code(), "validation");
    assert!(handle.get_cabin(9).await.unwrap().is_occupied());
}
