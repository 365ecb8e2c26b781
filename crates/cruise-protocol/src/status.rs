//! Human-readable status lines returned by mutations.
//!
//! The console shows these strings as-is. The vacate line is also parsed by
//! clients: when a guest was popped from the waiting list, the name sits in
//! the fixed pattern `"... successfully. <Name> is next on the waiting list"`.

use cruise_core::{CabinNumber, Money, VacateOutcome};

const VACATED_MARKER: &str = "successfully. ";
const NEXT_GUEST_SUFFIX: &str = " is next on the waiting list";

/// Status line for a successful vacate.
pub fn vacated(outcome: &VacateOutcome) -> String {
    let base = format!("Cabin {} vacated successfully.", outcome.cabin_number);
    match &outcome.next_waiting_guest {
        Some(guest) => format!("{base} {guest}{NEXT_GUEST_SUFFIX}"),
        None => base,
    }
}

/// Extracts the next waiting guest from a vacate status line.
///
/// Returns `None` for lines without a backfill candidate.
pub fn parse_next_guest(message: &str) -> Option<&str> {
    let start = message.find(VACATED_MARKER)? + VACATED_MARKER.len();
    let rest = message.get(start..)?;
    let end = rest.rfind(NEXT_GUEST_SUFFIX)?;
    rest.get(..end).filter(|name| !name.is_empty())
}

pub fn assigned(cabin_number: CabinNumber, passengers: usize) -> String {
    format!("{passengers} passenger(s) assigned to cabin {cabin_number} successfully.")
}

pub fn waiting_list_added(guest: &str, position: usize) -> String {
    format!("{guest} added to the waiting list at position {position}.")
}

pub fn expense_charged(cabin_number: i64, passenger_index: usize, amount: Money, total: Money) -> String {
    format!(
        "Charged {amount} to passenger #{passenger_index} in cabin {cabin_number}. Their expenses now total {total}."
    )
}

pub fn snapshot_loaded(occupied: usize) -> String {
    format!("Loaded all cabins from snapshot ({occupied} occupied).")
}
