//! Passenger value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Money, ShipError};

/// Fare category of a passenger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PassengerType {
    #[default]
    Adult,
    Child,
}

impl PassengerType {
    /// Returns the wire label ("ADULT" or "CHILD").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adult => "ADULT",
            Self::Child => "CHILD",
        }
    }
}

impl fmt::Display for PassengerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassengerType {
    type Err = ShipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADULT" => Ok(Self::Adult),
            "CHILD" => Ok(Self::Child),
            other => Err(ShipError::validation(format!(
                "Passenger type must be ADULT or CHILD (got '{other}')."
            ))),
        }
    }
}

/// A passenger seated in a cabin.
///
/// Serializes to the `{firstName, surname, expenses, type}` shape that the
/// console reads. A passenger only ever exists inside an occupied cabin and is
/// dropped, expenses included, when that cabin is vacated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub first_name: String,
    pub surname: String,
    pub expenses: Money,
    #[serde(rename = "type")]
    pub passenger_type: PassengerType,
}

impl Passenger {
    /// Creates a passenger with no expenses yet.
    pub fn new(
        first_name: impl Into<String>,
        surname: impl Into<String>,
        passenger_type: PassengerType,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            surname: surname.into(),
            expenses: Money::zero(),
            passenger_type,
        }
    }

    /// Sets the accumulated expenses (used when restoring a snapshot).
    #[must_use]
    pub fn with_expenses(mut self, expenses: Money) -> Self {
        self.expenses = expenses;
        self
    }

    /// "First Surname", the form the search index matches against.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.surname)
    }

    /// Returns a copy with surrounding whitespace stripped from both names.
    pub(crate) fn trimmed(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            surname: self.surname.trim().to_string(),
            expenses: self.expenses,
            passenger_type: self.passenger_type,
        }
    }
}

/// A passenger as submitted for assignment, before its type label is parsed.
///
/// Parsing is deferred to [`crate::Ship::assign_drafts`] so that range and
/// occupancy are reported ahead of a bad payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassengerDraft {
    pub first_name: String,
    pub surname: String,
    pub passenger_type: String,
}

impl PassengerDraft {
    pub fn new(
        first_name: impl Into<String>,
        surname: impl Into<String>,
        passenger_type: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            surname: surname.into(),
            passenger_type: passenger_type.into(),
        }
    }

    /// Resolves the type label into a passenger with zero expenses.
    ///
    /// # Errors
    ///
    /// `ShipError::Validation` when the label is not ADULT or CHILD.
    pub fn parse(&self) -> Result<Passenger, ShipError> {
        let passenger_type: PassengerType = self.passenger_type.parse()?;
        Ok(Passenger::new(
            self.first_name.clone(),
            self.surname.clone(),
            passenger_type,
        ))
    }
}

impl From<&Passenger> for PassengerDraft {
    fn from(p: &Passenger) -> Self {
        Self::new(p.first_name.clone(), p.surname.clone(), p.passenger_type.as_str())
    }
}
