//! Parsing of console arguments that clap cannot type on its own.

use cruise_core::{Money, PassengerType};
use cruise_protocol::NewPassenger;

use crate::error::{CliError, Result};

/// Parses `First:Surname[:TYPE]` into a new passenger.
///
/// The type defaults to `ADULT` and is case-insensitive. Whitespace around
/// each part is trimmed; blank names are left for the daemon to reject so the
/// console prints the registry's own validation message.
///
/// # Errors
///
/// `CliError::InvalidArgument` for a missing surname, extra parts, or an
/// unknown type.
pub fn parse_passenger(arg: &str) -> Result<NewPassenger> {
    let parts: Vec<&str> = arg.split(':').map(str::trim).collect();

    let (first, surname, kind) = match parts.as_slice() {
        [first, surname] => (*first, *surname, None),
        [first, surname, kind] => (*first, *surname, Some(*kind)),
        _ => {
            return Err(CliError::InvalidArgument(format!(
                "expected First:Surname[:ADULT|CHILD], got '{arg}'"
            )))
        }
    };

    let passenger_type = match kind {
        None => PassengerType::Adult,
        Some(kind) => kind
            .to_ascii_uppercase()
            .parse::<PassengerType>()
            .map_err(|e| CliError::InvalidArgument(e.to_string()))?,
    };

    Ok(NewPassenger::new(first, surname, passenger_type))
}

/// Parses a charge amount such as `12.50` or `$1,012.50`.
///
/// # Errors
///
/// `CliError::InvalidArgument` when the text is not a finite number.
pub fn parse_amount(arg: &str) -> Result<Money> {
    let cleaned: String = arg
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Money::from_dollars(value)),
        _ => Err(CliError::InvalidArgument(format!("'{arg}' is not an amount"))),
    }
}
