//! Cruise CLI - console client library
//!
//! Everything the `cruise` binary needs apart from argument parsing:
//!
//! - [`client`]: one-shot request/response over the daemon's Unix socket
//! - [`input`]: parsing of passenger and amount arguments
//! - [`render`]: plain-text tables for cabins, the roster and the waiting list
//! - [`error`]: the console error type
//!
//! **Panic-Free Policy:** No `.unwrap()`, `.expect()`, `panic!()`,
//! `unreachable!()`, or `todo!()` outside of tests.

pub mod client;
pub mod error;
pub mod input;
pub mod render;

pub use client::{ClientConfig, DaemonClient, VacateReply};
pub use error::{CliError, Result};
