//! Error types for the cruise console.
//!
//! A rejected request carries the daemon's message through untouched, so the
//! console can print exactly what the registry said ("Cabin 3 is already
//! occupied.") without a prefix.
//!
//! **Panic-Free Policy:** This module follows the project's panic-free guidelines.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Console Error Type
// ============================================================================

/// Console errors, from connecting to the daemon through rendering a reply.
#[derive(Error, Debug)]
pub enum CliError {
    /// Could not reach the daemon at all.
    ///
    /// Usually means `cruised` is not running or the socket path is wrong.
    #[error("Failed to connect to daemon: {0}")]
    DaemonConnection(String),

    /// Console and daemon speak incompatible protocol versions.
    #[error("Protocol version mismatch (client: {client_version}, daemon: {daemon_version})")]
    VersionMismatch {
        client_version: String,
        daemon_version: String,
    },

    /// The daemon answered with something other than what the request expects.
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// The daemon refused the request. Display is the daemon's message unchanged.
    #[error("{message}")]
    Daemon {
        message: String,
        code: Option<String>,
    },

    /// A command-line argument could not be parsed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Reading or writing a snapshot file failed.
    #[error("Failed to access {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The daemon did not answer in time.
    #[error("Timed out waiting for the daemon")]
    Timeout,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse message: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl CliError {
    /// The daemon's error kind, when the daemon rejected the request.
    pub fn daemon_code(&self) -> Option<&str> {
        match self {
            Self::Daemon { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Convenience Result type alias for console operations.
pub type Result<T> = std::result::Result<T, CliError>;

// ============================================================================
// Tests
// ============================================================================
