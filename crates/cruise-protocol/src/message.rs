//! JSON-lines envelopes exchanged between the console and the daemon.
//!
//! Requests are `ClientMessage`s: a protocol version plus a flattened,
//! `type`-tagged [`MessageType`]. Responses and pushes are `DaemonMessage`s.
//! Engine failures always come back as [`DaemonMessage::Error`] carrying the
//! exact error text and its kind code.

use chrono::{DateTime, Utc};
use cruise_core::{Money, ShipError};
use serde::{Deserialize, Serialize};

use crate::version::ProtocolVersion;
use crate::wire::{AssignRequest, CabinRecord, PassengerRecord, WaitingListRequest};

// ============================================================================
// Client -> Daemon
// ============================================================================

/// Requests a client can send.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageType {
    /// Handshake; must be the first message on a connection.
    Connect {
        #[serde(skip_serializing_if = "Option::is_none")]
        client_id: Option<String>,
    },

    ListCabins,

    AssignPassengers {
        cabin_number: i64,
        request: AssignRequest,
    },

    VacateCabin {
        cabin_number: i64,
    },

    FindPassengers {
        name: String,
    },

    TotalExpenses,

    OrderedPassengers,

    ChargeExpense {
        cabin_number: i64,
        passenger_index: usize,
        amount: Money,
    },

    WaitingList,

    AddToWaitingList {
        request: WaitingListRequest,
    },

    /// Bulk load. Kept as raw JSON so the snapshot codec reports shape errors.
    LoadCabins {
        cabins: serde_json::Value,
    },

    /// Receive a `cabin_list` now and `ship_updated` after every change.
    Subscribe,

    Unsubscribe,

    Ping {
        seq: u64,
    },

    Disconnect,
}

/// A request with its protocol version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientMessage {
    pub protocol_version: ProtocolVersion,

    #[serde(flatten)]
    pub message: MessageType,
}

impl ClientMessage {
    pub fn new(message: MessageType) -> Self {
        Self {
            protocol_version: ProtocolVersion::CURRENT,
            message,
        }
    }

    pub fn connect(client_id: Option<String>) -> Self {
        Self::new(MessageType::Connect { client_id })
    }

    pub fn list_cabins() -> Self {
        Self::new(MessageType::ListCabins)
    }

    pub fn assign_passengers(cabin_number: i64, request: AssignRequest) -> Self {
        Self::new(MessageType::AssignPassengers {
            cabin_number,
            request,
        })
    }

    pub fn vacate_cabin(cabin_number: i64) -> Self {
        Self::new(MessageType::VacateCabin { cabin_number })
    }

    pub fn find_passengers(name: impl Into<String>) -> Self {
        Self::new(MessageType::FindPassengers { name: name.into() })
    }

    pub fn total_expenses() -> Self {
        Self::new(MessageType::TotalExpenses)
    }

    pub fn ordered_passengers() -> Self {
        Self::new(MessageType::OrderedPassengers)
    }

    pub fn charge_expense(cabin_number: i64, passenger_index: usize, amount: Money) -> Self {
        Self::new(MessageType::ChargeExpense {
            cabin_number,
            passenger_index,
            amount,
        })
    }

    pub fn waiting_list() -> Self {
        Self::new(MessageType::WaitingList)
    }

    pub fn add_to_waiting_list(guest_name: impl Into<String>) -> Self {
        Self::new(MessageType::AddToWaitingList {
            request: WaitingListRequest {
                guest_name: guest_name.into(),
            },
        })
    }

    pub fn load_cabins(cabins: serde_json::Value) -> Self {
        Self::new(MessageType::LoadCabins { cabins })
    }

    pub fn subscribe() -> Self {
        Self::new(MessageType::Subscribe)
    }

    pub fn ping(seq: u64) -> Self {
        Self::new(MessageType::Ping { seq })
    }

    pub fn disconnect() -> Self {
        Self::new(MessageType::Disconnect)
    }
}

// ============================================================================
// Daemon -> Client
// ============================================================================

/// What changed, attached to `ship_updated` pushes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShipChange {
    CabinAssigned {
        cabin_number: u8,
    },
    CabinVacated {
        cabin_number: u8,
        #[serde(skip_serializing_if = "Option::is_none")]
        next_waiting_guest: Option<String>,
    },
    WaitingListChanged {
        length: usize,
    },
    ExpenseCharged {
        cabin_number: u8,
        passenger_index: usize,
    },
    SnapshotLoaded,
}

/// Responses and pushes sent by the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DaemonMessage {
    Connected {
        protocol_version: ProtocolVersion,
        client_id: String,
    },

    /// Handshake refused; the connection closes after this.
    Rejected {
        reason: String,
        protocol_version: ProtocolVersion,
    },

    /// All cabins, or the cabins matching a search.
    CabinList {
        cabins: Vec<CabinRecord>,
    },

    /// Success text for a mutation.
    Status {
        message: String,
    },

    Vacated {
        message: String,
        next_waiting_guest: Option<String>,
    },

    TotalExpenses {
        total: Money,
    },

    PassengerList {
        passengers: Vec<PassengerRecord>,
    },

    WaitingList {
        guests: Vec<String>,
    },

    /// Pushed to subscribers after every successful mutation.
    ShipUpdated {
        event: ShipChange,
        cabins: Vec<CabinRecord>,
        waiting_list: Vec<String>,
        at: DateTime<Utc>,
    },

    Pong {
        seq: u64,
    },

    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
}

impl DaemonMessage {
    pub fn connected(client_id: String) -> Self {
        Self::Connected {
            protocol_version: ProtocolVersion::CURRENT,
            client_id,
        }
    }

    pub fn rejected(reason: &str) -> Self {
        Self::Rejected {
            reason: reason.to_string(),
            protocol_version: ProtocolVersion::CURRENT,
        }
    }

    pub fn cabin_list(cabins: Vec<CabinRecord>) -> Self {
        Self::CabinList { cabins }
    }

    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    pub fn pong(seq: u64) -> Self {
        Self::Pong { seq }
    }

    pub fn error(message: &str) -> Self {
        Self::Error {
            message: message.to_string(),
            code: None,
        }
    }

    pub fn error_with_code(message: &str, code: &str) -> Self {
        Self::Error {
            message: message.to_string(),
            code: Some(code.to_string()),
        }
    }
}

impl From<&ShipError> for DaemonMessage {
    fn from(err: &ShipError) -> Self {
        Self::error_with_code(&err.to_string(), err.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::NewPassenger;
    use cruise_core::PassengerType;
    use serde_json::json;

    #[test]
    fn test_request_envelope_shape() {
        let msg = ClientMessage::vacate_cabin(3);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({"protocol_version": {"major": 1, "minor": 0}, "type": "vacate_cabin", "cabin_number": 3})
        );
    }

    #[test]
    fn test_assign_request_roundtrip() {
        let msg = ClientMessage::assign_passengers(
            3,
            AssignRequest {
                cabin_name: "Smith Family".to_string(),
                passengers: vec![NewPassenger::new("Ann", "Smith", PassengerType::Adult)],
            },
        );
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"cabinName\":\"Smith Family\""));

        let parsed: ClientMessage = serde_json::from_str(&json).unwrap();
        match parsed.message {
            MessageType::AssignPassengers { cabin_number, request } => {
                assert_eq!(cabin_number, 3);
                assert_eq!(request.passengers[0].passenger_type, "ADULT");
            }
            other => panic!("Expected AssignPassengers, got {other:?}"),
        }
    }

    #[test]
    fn test_waiting_list_request_carries_guest_name() {
        let value = serde_json::to_value(ClientMessage::add_to_waiting_list("Jones")).unwrap();
        assert_eq!(value["type"], "add_to_waiting_list");
        assert_eq!(value["request"], json!({"guestName": "Jones"}));
    }

    #[test]
    fn test_charge_amount_is_a_dollar_number() {
        let line = r#"{"protocol_version":{"major":1,"minor":0},"type":"charge_expense","cabin_number":2,"passenger_index":1,"amount":12.5}"#;
        let parsed: ClientMessage = serde_json::from_str(line).unwrap();
        match parsed.message {
            MessageType::ChargeExpense { amount, passenger_index, .. } => {
                assert_eq!(amount, Money::from_dollars(12.5));
                assert_eq!(passenger_index, 1);
            }
            other => panic!("Expected ChargeExpense, got {other:?}"),
        }
    }

    #[test]
    fn test_total_is_a_bare_number() {
        let value = serde_json::to_value(DaemonMessage::TotalExpenses {
            total: Money::from_dollars(125.5),
        })
        .unwrap();
        assert_eq!(value, json!({"type": "total_expenses", "total": 125.5}));
    }

    #[test]
    fn test_error_from_ship_error() {
        let err = ShipError::CabinOccupied { cabin_number: 4 };
        let value = serde_json::to_value(DaemonMessage::from(&err)).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["message"], "Cabin 4 is already occupied.");
        assert_eq!(value["code"], "cabin_occupied");
    }

    #[test]
    fn test_ship_updated_roundtrip() {
        let msg = DaemonMessage::ShipUpdated {
            event: ShipChange::CabinVacated {
                cabin_number: 3,
                next_waiting_guest: Some("Jones".to_string()),
            },
            cabins: Vec::new(),
            waiting_list: Vec::new(),
            at: Utc::now(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"kind\":\"cabin_vacated\""));

        let parsed: DaemonMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            parsed,
            DaemonMessage::ShipUpdated { event: ShipChange::CabinVacated { cabin_number: 3, .. }, .. }
        ));
    }
}
