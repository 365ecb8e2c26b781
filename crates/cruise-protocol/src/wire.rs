//! JSON record shapes shared with the console and the export file.
//!
//! Field names are camelCase because these records are consumed verbatim by
//! the presentation layer:
//!
//! ```text
//! {"cabinNumber": 3, "cabinName": "Smith Family",
//!  "passengers": [{"firstName": "Ann", "surname": "Smith", "expenses": 0.0, "type": "ADULT"}]}
//! ```
//!
//! An empty cabin is written with `cabinName: "e"` and no passengers.

use cruise_core::{
    Cabin, Passenger, PassengerDraft, PassengerType, ShipError, ShipResult, EMPTY_CABIN_NAME,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Cabin / Passenger Records
// ============================================================================

/// One passenger as it appears in cabin lists, the roster and snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PassengerRecord {
    pub first_name: String,
    pub surname: String,
    pub expenses: f64,
    #[serde(rename = "type")]
    pub passenger_type: String,
}

impl From<&Passenger> for PassengerRecord {
    fn from(p: &Passenger) -> Self {
        Self {
            first_name: p.first_name.clone(),
            surname: p.surname.clone(),
            expenses: p.expenses.as_dollars(),
            passenger_type: p.passenger_type.as_str().to_string(),
        }
    }
}

impl TryFrom<&PassengerRecord> for Passenger {
    type Error = ShipError;

    fn try_from(record: &PassengerRecord) -> ShipResult<Self> {
        let passenger_type: PassengerType = record.passenger_type.parse()?;
        if !record.expenses.is_finite() || record.expenses < 0.0 {
            return Err(ShipError::validation(format!(
                "Expenses for {} {} must be a non-negative amount.",
                record.first_name, record.surname
            )));
        }
        Ok(
            Passenger::new(record.first_name.clone(), record.surname.clone(), passenger_type)
                .with_expenses(cruise_core::Money::from_dollars(record.expenses)),
        )
    }
}

/// One cabin as it appears in cabin lists, search results and snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CabinRecord {
    pub cabin_number: i64,
    pub cabin_name: String,
    pub passengers: Vec<PassengerRecord>,
}

impl CabinRecord {
    /// True when the record uses the empty-cabin marker.
    pub fn is_empty_marker(&self) -> bool {
        self.cabin_name == EMPTY_CABIN_NAME
    }
}

impl From<&Cabin> for CabinRecord {
    fn from(cabin: &Cabin) -> Self {
        Self {
            cabin_number: i64::from(cabin.number().get()),
            cabin_name: cabin.name().unwrap_or(EMPTY_CABIN_NAME).to_string(),
            passengers: cabin.passengers().iter().map(PassengerRecord::from).collect(),
        }
    }
}

/// Converts a slice of cabins to records, preserving order.
pub fn cabin_records(cabins: &[Cabin]) -> Vec<CabinRecord> {
    cabins.iter().map(CabinRecord::from).collect()
}

/// Converts seated passengers to records, preserving order.
pub fn passenger_records(passengers: &[Passenger]) -> Vec<PassengerRecord> {
    passengers.iter().map(PassengerRecord::from).collect()
}

// ============================================================================
// Requests
// ============================================================================

/// A passenger in an assignment request. Expenses always start at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPassenger {
    pub first_name: String,
    pub surname: String,
    #[serde(rename = "type")]
    pub passenger_type: String,
}

impl NewPassenger {
    pub fn new(
        first_name: impl Into<String>,
        surname: impl Into<String>,
        passenger_type: PassengerType,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            surname: surname.into(),
            passenger_type: passenger_type.as_str().to_string(),
        }
    }
}

/// Body of an "assign passengers to cabin" request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub cabin_name: String,
    pub passengers: Vec<NewPassenger>,
}

impl AssignRequest {
    /// The passengers as unparsed drafts.
    ///
    /// Type labels are resolved by the ship, after it has checked the cabin
    /// number and occupancy.
    pub fn to_drafts(&self) -> Vec<PassengerDraft> {
        self.passengers.iter().map(PassengerDraft::from).collect()
    }
}

impl From<&NewPassenger> for PassengerDraft {
    fn from(p: &NewPassenger) -> Self {
        PassengerDraft::new(p.first_name.clone(), p.surname.clone(), p.passenger_type.clone())
    }
}

/// Body of an "add to waiting list" request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingListRequest {
    pub guest_name: String,
}
