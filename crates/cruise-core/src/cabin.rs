//! Cabin identity and occupancy state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Passenger, ShipError, ShipResult};

// ============================================================================
// Ship Layout
// ============================================================================

/// Number of cabins on the ship. Fixed for the life of the process.
pub const CABIN_COUNT: usize = 12;

/// Highest valid cabin number.
pub const MAX_CABIN_NUMBER: u8 = (CABIN_COUNT - 1) as u8;

/// Maximum passengers seated in one cabin.
pub const MAX_PASSENGERS_PER_CABIN: usize = 3;

/// Booking name the wire format uses for an unoccupied cabin.
pub const EMPTY_CABIN_NAME: &str = "e";

// ============================================================================
// Cabin Number
// ============================================================================

/// A cabin number known to be within `0..=MAX_CABIN_NUMBER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct CabinNumber(u8);

impl CabinNumber {
    /// Validates a raw cabin number.
    ///
    /// # Errors
    ///
    /// `ShipError::InvalidCabin` when the number is outside `0..=11`.
    pub fn new(number: i64) -> ShipResult<Self> {
        match u8::try_from(number) {
            Ok(n) if n <= MAX_CABIN_NUMBER => Ok(Self(n)),
            _ => Err(ShipError::InvalidCabin {
                cabin_number: number,
                max: MAX_CABIN_NUMBER,
            }),
        }
    }

    /// All cabin numbers in ascending order.
    pub fn all() -> impl Iterator<Item = CabinNumber> {
        (0..=MAX_CABIN_NUMBER).map(CabinNumber)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Position of this cabin in the ship's cabin array.
    pub fn index(&self) -> usize {
        usize::from(self.0)
    }
}

impl TryFrom<i64> for CabinNumber {
    type Error = ShipError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CabinNumber> for u8 {
    fn from(number: CabinNumber) -> Self {
        number.0
    }
}

impl fmt::Display for CabinNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Cabin
// ============================================================================

/// Occupancy of a cabin.
///
/// A cabin either has nobody in it or has a booking name together with
/// one to three passengers; the two never change independently.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CabinState {
    #[default]
    Empty,
    Occupied {
        name: String,
        passengers: Vec<Passenger>,
    },
}

/// One of the ship's fixed cabins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cabin {
    number: CabinNumber,
    state: CabinState,
}

impl Cabin {
    /// Creates an unoccupied cabin.
    pub fn empty(number: CabinNumber) -> Self {
        Self {
            number,
            state: CabinState::Empty,
        }
    }

    /// Creates an occupied cabin. Contents are not validated here; the
    /// `Ship` checks every cabin before it accepts it.
    pub fn occupied(number: CabinNumber, name: impl Into<String>, passengers: Vec<Passenger>) -> Self {
        Self {
            number,
            state: CabinState::Occupied {
                name: name.into(),
                passengers,
            },
        }
    }

    pub fn number(&self) -> CabinNumber {
        self.number
    }

    pub fn state(&self) -> &CabinState {
        &self.state
    }

    pub fn is_occupied(&self) -> bool {
        matches!(self.state, CabinState::Occupied { .. })
    }

    /// Booking name, or `None` when the cabin is empty.
    pub fn name(&self) -> Option<&str> {
        match &self.state {
            CabinState::Empty => None,
            CabinState::Occupied { name, .. } => Some(name),
        }
    }

    /// Seated passengers; empty slice when the cabin is empty.
    pub fn passengers(&self) -> &[Passenger] {
        match &self.state {
            CabinState::Empty => &[],
            CabinState::Occupied { passengers, .. } => passengers,
        }
    }

    pub(crate) fn passengers_mut(&mut self) -> Option<&mut Vec<Passenger>> {
        match &mut self.state {
            CabinState::Empty => None,
            CabinState::Occupied { passengers, .. } => Some(passengers),
        }
    }

    /// Replaces the occupancy state, returning the previous one.
    pub(crate) fn replace_state(&mut self, state: CabinState) -> CabinState {
        std::mem::replace(&mut self.state, state)
    }
}
