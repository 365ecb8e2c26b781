//! Registry actor commands, errors, and events.
//!
//! - `RegistryCommand`: requests sent to the actor, each with a oneshot reply
//! - `RegistryError`: a rejected ship operation, or a stopped actor
//! - `ShipEvent`: published after every successful mutation

use chrono::{DateTime, Utc};
use cruise_core::{Cabin, Money, Passenger, PassengerDraft, ShipError, VacateOutcome};
use cruise_protocol::ShipChange;
use thiserror::Error;
use tokio::sync::oneshot;

// ============================================================================
// Registry Commands
// ============================================================================

/// Commands sent to the registry actor.
///
/// Cabin numbers travel as raw integers so the range check, and its error
/// message, stay inside the `Ship`.
#[derive(Debug)]
pub enum RegistryCommand {
    GetAllCabins {
        respond_to: oneshot::Sender<Vec<Cabin>>,
    },

    GetCabin {
        cabin_number: i64,
        respond_to: oneshot::Sender<Result<Cabin, RegistryError>>,
    },

    /// Seat a party in an empty cabin. Replies with the stored cabin.
    ///
    /// Passenger types arrive unparsed; the ship resolves them after the range
    /// and occupancy checks.
    ///
    /// # Errors
    /// - `ShipError::InvalidCabin`, `ShipError::CabinOccupied`, `ShipError::Validation`
    AssignPassengers {
        cabin_number: i64,
        cabin_name: String,
        passengers: Vec<PassengerDraft>,
        respond_to: oneshot::Sender<Result<Cabin, RegistryError>>,
    },

    /// Empty a cabin and pop the next waiting guest.
    ///
    /// # Errors
    /// - `ShipError::InvalidCabin`, `ShipError::CabinAlreadyEmpty`
    VacateCabin {
        cabin_number: i64,
        respond_to: oneshot::Sender<Result<VacateOutcome, RegistryError>>,
    },

    /// Append a guest to the waiting list. Replies with the new length.
    ///
    /// # Errors
    /// - `ShipError::ShipNotFull`, `ShipError::Validation`
    AddToWaitingList {
        guest_name: String,
        respond_to: oneshot::Sender<Result<usize, RegistryError>>,
    },

    GetWaitingList {
        respond_to: oneshot::Sender<Vec<String>>,
    },

    FindCabins {
        query: String,
        respond_to: oneshot::Sender<Vec<Cabin>>,
    },

    TotalExpenses {
        respond_to: oneshot::Sender<Money>,
    },

    OrderedPassengers {
        respond_to: oneshot::Sender<Vec<Passenger>>,
    },

    /// Add to one passenger's expenses. Replies with their new total.
    ChargeExpense {
        cabin_number: i64,
        passenger_index: usize,
        amount: Money,
        respond_to: oneshot::Sender<Result<Money, RegistryError>>,
    },

    /// Replace all twelve cabins. Validated in full before anything changes.
    LoadSnapshot {
        cabins: Vec<Cabin>,
        respond_to: oneshot::Sender<Result<(), RegistryError>>,
    },
}

// ============================================================================
// Registry Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The ship rejected the operation. Displays the ship's message unchanged.
    #[error(transparent)]
    Ship(#[from] ShipError),

    /// The actor has shut down.
    #[error("registry is not running")]
    ChannelClosed,
}

impl RegistryError {
    /// Machine-readable kind, as sent in `error.code`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ship(err) => err.code(),
            Self::ChannelClosed => "unavailable",
        }
    }
}

// ============================================================================
// Ship Events
// ============================================================================

/// A successful mutation, with the state right after it.
///
/// Carrying the full cabin list lets subscribers redraw without a second
/// round trip.
#[derive(Debug, Clone)]
pub struct ShipEvent {
    pub change: ShipChange,
    pub cabins: Vec<Cabin>,
    pub waiting_list: Vec<String>,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_display_is_ship_message() {
        let err = RegistryError::from(ShipError::CabinAlreadyEmpty { cabin_number: 7 });
        assert_eq!(err.to_string(), "Cabin 7 is already empty.");
        assert_eq!(err.code(), "cabin_already_empty");

        assert_eq!(RegistryError::ChannelClosed.to_string(), "registry is not running");
        assert_eq!(RegistryError::ChannelClosed.code(), "unavailable");
    }

    #[tokio::test]
    async fn test_command_channel_closed_error() {
        let (tx, rx) = oneshot::channel::<Result<(), RegistryError>>();
        drop(tx);
        assert!(rx.await.is_err());
    }
}
