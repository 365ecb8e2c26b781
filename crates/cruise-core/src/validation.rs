//! Input validation for passengers, cabin assignments and guest names.
//!
//! These are pure functions. Every mutating `Ship` operation runs them before
//! touching state, so a rejected request never leaves a cabin half-written.

use crate::cabin::{EMPTY_CABIN_NAME, MAX_PASSENGERS_PER_CABIN};
use crate::{CabinNumber, Passenger, ShipError, ShipResult};

/// Minimum length of a first name, surname or booking name after trimming.
pub const MIN_NAME_LEN: usize = 2;

fn trimmed_len(value: &str) -> usize {
    value.trim().chars().count()
}

/// Checks a single passenger.
///
/// The passenger type is an enum, so an unknown type can only arrive through
/// string parsing (`PassengerType::from_str`), which reports it there.
///
/// # Errors
///
/// `ShipError::Validation` when either name is shorter than two characters
/// after trimming, or when the expenses are negative.
pub fn validate_passenger(passenger: &Passenger) -> ShipResult<()> {
    if trimmed_len(&passenger.first_name) < MIN_NAME_LEN {
        return Err(ShipError::validation(format!(
            "First name must have at least {MIN_NAME_LEN} characters (got '{}').",
            passenger.first_name
        )));
    }
    if trimmed_len(&passenger.surname) < MIN_NAME_LEN {
        return Err(ShipError::validation(format!(
            "Surname must have at least {MIN_NAME_LEN} characters (got '{}').",
            passenger.surname
        )));
    }
    if passenger.expenses.is_negative() {
        return Err(ShipError::validation(format!(
            "Expenses for {} cannot be negative.",
            passenger.full_name()
        )));
    }
    Ok(())
}

/// Checks a booking name.
///
/// # Errors
///
/// `ShipError::Validation` when the name is shorter than two characters after
/// trimming or is the empty-cabin marker.
pub fn validate_cabin_name(cabin_name: &str) -> ShipResult<()> {
    if cabin_name.trim() == EMPTY_CABIN_NAME {
        return Err(ShipError::validation(format!(
            "'{EMPTY_CABIN_NAME}' is reserved for empty cabins and cannot be used as a cabin name."
        )));
    }
    if trimmed_len(cabin_name) < MIN_NAME_LEN {
        return Err(ShipError::validation(format!(
            "Cabin name must have at least {MIN_NAME_LEN} characters."
        )));
    }
    Ok(())
}

/// Checks a full cabin assignment and returns the validated cabin number.
///
/// # Errors
///
/// - `ShipError::InvalidCabin` when the number is outside `0..=11`
/// - `ShipError::Validation` for a bad booking name, a passenger count outside
///   `1..=3`, or any passenger failing [`validate_passenger`]
pub fn validate_cabin_assignment(
    cabin_number: i64,
    cabin_name: &str,
    passengers: &[Passenger],
) -> ShipResult<CabinNumber> {
    let number = CabinNumber::new(cabin_number)?;
    validate_cabin_name(cabin_name)?;

    if passengers.is_empty() || passengers.len() > MAX_PASSENGERS_PER_CABIN {
        return Err(ShipError::validation(format!(
            "A cabin holds between 1 and {MAX_PASSENGERS_PER_CABIN} passengers (got {}).",
            passengers.len()
        )));
    }

    for passenger in passengers {
        validate_passenger(passenger)?;
    }

    Ok(number)
}

/// Checks a waiting-list guest name and returns it trimmed.
///
/// # Errors
///
/// `ShipError::Validation` when the name is blank.
pub fn validate_guest_name(name: &str) -> ShipResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ShipError::validation("Please enter a guest name."));
    }
    Ok(trimmed.to_string())
}
