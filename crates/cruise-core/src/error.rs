//! Domain-specific error types following panic-free policy.

use thiserror::Error;

/// Errors that can occur in ship registry operations.
///
/// The `Display` text of each variant is the message surfaced to callers
/// unchanged, so it is written for people rather than for logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShipError {
    /// Malformed or out-of-range input. Always detected before mutation.
    #[error("{0}")]
    Validation(String),

    /// Assignment onto a cabin that already has passengers.
    #[error("Cabin {cabin_number} is already occupied.")]
    CabinOccupied { cabin_number: u8 },

    /// Vacate (or charge) on a cabin with nobody in it.
    #[error("Cabin {cabin_number} is already empty.")]
    CabinAlreadyEmpty { cabin_number: u8 },

    /// Cabin number outside the ship's fixed range.
    #[error("Invalid cabin number {cabin_number}. Cabin numbers run from 0 to {max}.")]
    InvalidCabin { cabin_number: i64, max: u8 },

    /// Waiting-list addition while cabins are still free.
    #[error("The ship is not full ({vacant} cabin(s) available). Guests can only be added to the waiting list when every cabin is occupied.")]
    ShipNotFull { vacant: usize },
}

impl ShipError {
    /// Creates a validation error from any displayable reason.
    pub fn validation(reason: impl std::fmt::Display) -> Self {
        Self::Validation(reason.to_string())
    }

    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::CabinOccupied { .. } => "cabin_occupied",
            Self::CabinAlreadyEmpty { .. } => "cabin_already_empty",
            Self::InvalidCabin { .. } => "invalid_cabin",
            Self::ShipNotFull { .. } => "ship_not_full",
        }
    }
}

/// Result type for ship operations.
pub type ShipResult<T> = Result<T, ShipError>;
