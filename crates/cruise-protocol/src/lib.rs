//! Cruise Protocol - Wire shapes for daemon communication
//!
//! This crate provides the JSON records the console consumes verbatim
//! (cabins, passengers, request bodies), the all-or-nothing snapshot codec,
//! the vacate status-line format, and the JSON-lines envelopes exchanged
//! between `cruise` and `cruised`.

pub mod message;
pub mod snapshot;
pub mod status;
pub mod version;
pub mod wire;

pub use message::{ClientMessage, DaemonMessage, MessageType, ShipChange};
pub use version::ProtocolVersion;
pub use wire::{AssignRequest, CabinRecord, NewPassenger, PassengerRecord, WaitingListRequest};
