//! Cruise Core - Cabin occupancy and waiting-list engine
//!
//! This crate provides the domain types and the synchronous `Ship` aggregate
//! shared between the daemon (cruised) and the console (cruise).
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

pub mod cabin;
pub mod error;
pub mod expenses;
pub mod money;
pub mod passenger;
pub mod search;
pub mod ship;
pub mod validation;
pub mod waiting_list;

// Re-exports for convenience
pub use cabin::{
    Cabin, CabinNumber, CabinState, CABIN_COUNT, EMPTY_CABIN_NAME, MAX_CABIN_NUMBER,
    MAX_PASSENGERS_PER_CABIN,
};
pub use error::{ShipError, ShipResult};
pub use expenses::{cabin_total, ordered_passengers, total_expenses};
pub use money::Money;
pub use passenger::{Passenger, PassengerDraft, PassengerType};
pub use search::find_cabins_by_name;
pub use ship::{Ship, VacateOutcome};
pub use validation::{validate_cabin_assignment, validate_passenger};
pub use waiting_list::{is_ship_full, WaitingList};
