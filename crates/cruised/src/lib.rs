//! Cruise Daemon - Ship registry and console server
//!
//! This crate provides the infrastructure behind the `cruised` binary:
//! - `registry` - Actor that owns the one `Ship` and serializes every operation
//! - `server` - Unix socket JSON-lines server for consoles
//! - `config` - TOML config file plus environment overrides
//! - `persistence` - Snapshot file restore at startup and save at shutdown
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       cruised daemon                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ┌─────────────────┐     ┌─────────────────────────────┐    │
//! │  │  DaemonServer   │────▶│     RegistryActor           │    │
//! │  │ (Unix Socket)   │     │  (Ship owner)               │    │
//! │  └────────┬────────┘     └──────────────┬──────────────┘    │
//! │           │                             │                   │
//! │           │ connections                 │ ShipEvent         │
//! │           ▼                             ▼                   │
//! │  ┌─────────────────┐     ┌─────────────────────────────┐    │
//! │  │ConnectionHandler│     │   broadcast::Sender         │    │
//! │  │  (per console)  │     │   (subscriber pushes)       │    │
//! │  └─────────────────┘     └─────────────────────────────┘    │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Panic-Free Guarantees
//!
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()` outside tests
//! - All fallible operations return `Result` or `Option`
//! - Channel operations handle closure gracefully

pub mod config;
pub mod persistence;
pub mod registry;
pub mod server;
