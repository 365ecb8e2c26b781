//! Whole-ship export and import.
//!
//! Export is the lossless twelve-record array that the console saves to a
//! file. Import parses that array back into validated cabins; nothing is
//! returned unless every record is well-formed, so a caller that only applies
//! `Ok` results can never half-load a file.

use std::collections::HashSet;

use cruise_core::{Cabin, CabinNumber, Passenger, Ship, ShipError, ShipResult, CABIN_COUNT};

use crate::wire::CabinRecord;

/// Exports all twelve cabins in ascending order.
pub fn export(ship: &Ship) -> Vec<CabinRecord> {
    crate::wire::cabin_records(ship.cabins())
}

/// Parses snapshot JSON text.
///
/// # Errors
///
/// `ShipError::Validation` for invalid JSON or any error listed on [`import_records`].
pub fn import_str(json: &str) -> ShipResult<Vec<Cabin>> {
    let records: Vec<CabinRecord> = serde_json::from_str(json).map_err(malformed)?;
    import_records(&records)
}

/// Parses an already-decoded snapshot value.
///
/// # Errors
///
/// `ShipError::Validation` for a wrong shape or any error listed on [`import_records`].
pub fn import_value(value: serde_json::Value) -> ShipResult<Vec<Cabin>> {
    let records: Vec<CabinRecord> = serde_json::from_value(value).map_err(malformed)?;
    import_records(&records)
}

/// Validates snapshot records and converts them to cabins, ascending.
///
/// # Errors
///
/// `ShipError::Validation` when:
/// - there are not exactly twelve records
/// - a cabin number is out of range or repeated
/// - an empty-marked cabin lists passengers
/// - a passenger has an unknown type or negative expenses
/// - an occupied cabin fails assignment validation
pub fn import_records(records: &[CabinRecord]) -> ShipResult<Vec<Cabin>> {
    if records.len() != CABIN_COUNT {
        return Err(ShipError::validation(format!(
            "A snapshot must contain exactly {CABIN_COUNT} cabins (got {}).",
            records.len()
        )));
    }

    let mut seen = HashSet::with_capacity(CABIN_COUNT);
    let mut cabins = Vec::with_capacity(CABIN_COUNT);

    for record in records {
        let number = CabinNumber::new(record.cabin_number)
            .map_err(|e| ShipError::validation(format!("Snapshot rejected: {e}")))?;

        if !seen.insert(number) {
            return Err(ShipError::validation(format!(
                "Cabin {number} appears more than once in the snapshot."
            )));
        }

        cabins.push(record_to_cabin(number, record)?);
    }

    // Run the same checks a live load would, on a scratch ship
    let mut scratch = Ship::new();
    scratch.load_snapshot(cabins)?;
    Ok(scratch.get_all_cabins())
}

fn record_to_cabin(number: CabinNumber, record: &CabinRecord) -> ShipResult<Cabin> {
    if record.is_empty_marker() {
        if !record.passengers.is_empty() {
            return Err(ShipError::validation(format!(
                "Cabin {number} is marked empty but lists {} passenger(s).",
                record.passengers.len()
            )));
        }
        return Ok(Cabin::empty(number));
    }

    let passengers = record
        .passengers
        .iter()
        .map(Passenger::try_from)
        .collect::<ShipResult<Vec<_>>>()?;

    Ok(Cabin::occupied(number, record.cabin_name.clone(), passengers))
}

fn malformed(err: serde_json::Error) -> ShipError {
    ShipError::validation(format!("Snapshot is not a valid cabin export: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cruise_core::{Money, PassengerType};
    use serde_json::json;

    fn populated_ship() -> Ship {
        let mut ship = Ship::new();
        ship.assign_passengers(
            3,
            "Smith Family",
            vec![
                Passenger::new("Ann", "Smith", PassengerType::Adult),
                Passenger::new("Tim", "Smith", PassengerType::Child),
            ],
        )
        .unwrap();
        ship.assign_passengers(
            11,
            "Solo",
            vec![Passenger::new("Kim", "Lee", PassengerType::Adult)],
        )
        .unwrap();
        ship.charge_expense(3, 1, Money::from_dollars(19.99)).unwrap();
        ship.charge_expense(11, 0, Money::from_dollars(0.01)).unwrap();
        ship
    }

    fn empty_records() -> Vec<serde_json::Value> {
        (0..12)
            .map(|n| json!({"cabinNumber": n, "cabinName": "e", "passengers": []}))
            .collect()
    }

    #[test]
    fn test_export_is_twelve_ascending_records() {
        let records = export(&populated_ship());
        assert_eq!(records.len(), 12);
        let numbers: Vec<i64> = records.iter().map(|r| r.cabin_number).collect();
        assert_eq!(numbers, (0..12).collect::<Vec<i64>>());
        assert_eq!(records[0].cabin_name, "e");
        assert_eq!(records[3].passengers[1].expenses, 19.99);
    }

    #[test]
    fn test_round_trip_preserves_state() {
        let ship = populated_ship();
        let json = serde_json::to_string_pretty(&export(&ship)).unwrap();

        let cabins = import_str(&json).unwrap();
        let mut restored = Ship::new();
        restored.load_snapshot(cabins).unwrap();

        assert_eq!(restored.cabins(), ship.cabins());
    }

    #[test]
    fn test_import_accepts_shuffled_order() {
        let mut records = empty_records();
        records.reverse();
        let cabins = import_value(json!(records)).unwrap();
        assert_eq!(cabins[0].number().get(), 0);
        assert_eq!(cabins[11].number().get(), 11);
    }

    #[test]
    fn test_import_rejects_wrong_count() {
        let mut records = empty_records();
        records.pop();
        let err = import_value(json!(records)).unwrap_err();
        assert!(err.to_string().contains("exactly 12"));
    }

    #[test]
    fn test_import_rejects_out_of_range_number() {
        let mut records = empty_records();
        records[0] = json!({"cabinNumber": 12, "cabinName": "e", "passengers": []});
        let err = import_value(json!(records)).unwrap_err();
        assert_eq!(err.code(), "validation");
    }

    #[test]
    fn test_import_rejects_duplicate_number() {
        let mut records = empty_records();
        records[1] = json!({"cabinNumber": 0, "cabinName": "e", "passengers": []});
        let err = import_value(json!(records)).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_import_rejects_wrong_field_names_and_types() {
        let mut records = empty_records();
        records[2] = json!({"cabin_number": 2, "cabinName": "e", "passengers": []});
        assert!(import_value(json!(records)).is_err());

        let mut records = empty_records();
        records[2] = json!({"cabinNumber": "two", "cabinName": "e", "passengers": []});
        assert!(import_value(json!(records)).is_err());

        let mut records = empty_records();
        records[2] = json!({"cabinNumber": 2, "cabinName": "e", "passengers": [], "deck": 4});
        assert!(import_value(json!(records)).is_err());

        assert!(import_str("not json").is_err());
        assert!(import_value(json!({"cabins": []})).is_err());
    }

    #[test]
    fn test_import_rejects_marker_with_passengers() {
        let mut records = empty_records();
        records[5] = json!({
            "cabinNumber": 5,
            "cabinName": "e",
            "passengers": [{"firstName": "Ann", "surname": "Smith", "expenses": 0, "type": "ADULT"}]
        });
        let err = import_value(json!(records)).unwrap_err();
        assert!(err.to_string().contains("marked empty"));
    }

    #[test]
    fn test_import_rejects_invalid_occupants() {
        let mut records = empty_records();
        records[5] = json!({"cabinNumber": 5, "cabinName": "Smiths", "passengers": []});
        assert!(import_value(json!(records)).is_err());

        let mut records = empty_records();
        records[5] = json!({
            "cabinNumber": 5,
            "cabinName": "Smiths",
            "passengers": [{"firstName": "Ann", "surname": "Smith", "expenses": 0, "type": "PET"}]
        });
        assert!(import_value(json!(records)).is_err());
    }
}
