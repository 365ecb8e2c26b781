//! One-shot daemon client for the cruise console.
//!
//! Each console command opens a connection, performs the `connect` handshake,
//! sends one request, reads one reply and disconnects. Replies are matched to
//! the shape each request expects; an `error` reply becomes
//! [`CliError::Daemon`] with the registry's message intact.
//!
//! **Panic-Free Policy:** This module follows the project's panic-free guidelines.
//! No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, or `todo!()`.

use std::path::PathBuf;
use std::time::Duration;

use cruise_core::Money;
use cruise_protocol::{
    status, AssignRequest, CabinRecord, ClientMessage, DaemonMessage, NewPassenger,
    PassengerRecord, ProtocolVersion,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::error::{CliError, Result};

// ============================================================================
// Configuration
// ============================================================================

/// Default socket the daemon listens on.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/cruise.sock";

/// Connection settings for the console.
///
/// # Example
///
/// ```rust
/// use cruise_cli::ClientConfig;
///
/// let config = ClientConfig {
///     socket_path: std::path::PathBuf::from("/tmp/test-cruise.sock"),
///     ..Default::default()
/// };
/// assert_eq!(config.timeout.as_secs(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Path to the Unix socket where the daemon listens.
    pub socket_path: PathBuf,

    /// Upper bound on connecting and on waiting for each reply.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            timeout: Duration::from_secs(5),
        }
    }
}

// ============================================================================
// Replies
// ============================================================================

/// Result of vacating a cabin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacateReply {
    /// The status line exactly as the daemon phrased it.
    pub message: String,
    /// Head of the waiting list popped by this vacate, if any.
    pub next_waiting_guest: Option<String>,
}

// ============================================================================
// Daemon Client
// ============================================================================

/// A connected, handshaken session with the daemon.
pub struct DaemonClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    timeout: Duration,
    client_id: String,
}

impl DaemonClient {
    /// Connects to the daemon and completes the handshake.
    ///
    /// # Errors
    ///
    /// - `DaemonConnection` when the socket cannot be reached
    /// - `VersionMismatch` when the daemon rejects or advertises an
    ///   incompatible protocol version
    /// - `Timeout` when the daemon does not answer the handshake
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let stream = timeout(config.timeout, UnixStream::connect(&config.socket_path))
            .await
            .map_err(|_| CliError::Timeout)?
            .map_err(|e| {
                CliError::DaemonConnection(format!(
                    "{} ({e}). Is cruised running?",
                    config.socket_path.display()
                ))
            })?;

        let (reader, writer) = stream.into_split();
        let mut client = Self {
            reader: BufReader::new(reader),
            writer,
            timeout: config.timeout,
            client_id: String::new(),
        };

        client.send(&ClientMessage::connect(None)).await?;
        match client.recv().await? {
            DaemonMessage::Connected {
                protocol_version,
                client_id,
            } => {
                if !ProtocolVersion::CURRENT.is_compatible_with(&protocol_version) {
                    return Err(version_mismatch(protocol_version));
                }
                info!(client_id, protocol_version = %protocol_version, "Handshake complete");
                client.client_id = client_id;
                Ok(client)
            }
            DaemonMessage::Rejected {
                protocol_version, ..
            } => Err(version_mismatch(protocol_version)),
            other => Err(unexpected("connect", &other)),
        }
    }

    /// The id the daemon assigned to this connection.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Sends one request and returns the daemon's reply.
    ///
    /// # Errors
    ///
    /// `CliError::Daemon` when the daemon answers with an `error` line.
    pub async fn request(&mut self, message: &ClientMessage) -> Result<DaemonMessage> {
        self.send(message).await?;
        match self.recv().await? {
            DaemonMessage::Error { message, code } => Err(CliError::Daemon { message, code }),
            reply => Ok(reply),
        }
    }

    /// Closes the session politely.
    pub async fn disconnect(mut self) -> Result<()> {
        self.send(&ClientMessage::disconnect()).await
    }

    // ------------------------------------------------------------------------
    // Typed requests
    // ------------------------------------------------------------------------

    /// All twelve cabins, ascending.
    pub async fn list_cabins(&mut self) -> Result<Vec<CabinRecord>> {
        match self.request(&ClientMessage::list_cabins()).await? {
            DaemonMessage::CabinList { cabins } => Ok(cabins),
            other => Err(unexpected("list_cabins", &other)),
        }
    }

    /// Seats a party in a cabin; returns the status line.
    pub async fn assign(
        &mut self,
        cabin_number: i64,
        cabin_name: &str,
        passengers: Vec<NewPassenger>,
    ) -> Result<String> {
        let request = AssignRequest {
            cabin_name: cabin_name.to_string(),
            passengers,
        };
        self.expect_status("assign_passengers", ClientMessage::assign_passengers(cabin_number, request))
            .await
    }

    /// Vacates a cabin.
    ///
    /// The next guest is read from the structured field and, failing that,
    /// recovered from the status line.
    pub async fn vacate(&mut self, cabin_number: i64) -> Result<VacateReply> {
        match self.request(&ClientMessage::vacate_cabin(cabin_number)).await? {
            DaemonMessage::Vacated {
                message,
                next_waiting_guest,
            } => {
                let next_waiting_guest = next_waiting_guest
                    .or_else(|| status::parse_next_guest(&message).map(str::to_string));
                Ok(VacateReply {
                    message,
                    next_waiting_guest,
                })
            }
            DaemonMessage::Status { message } => Ok(VacateReply {
                next_waiting_guest: status::parse_next_guest(&message).map(str::to_string),
                message,
            }),
            other => Err(unexpected("vacate_cabin", &other)),
        }
    }

    /// Cabins whose name contains `name`.
    pub async fn find(&mut self, name: &str) -> Result<Vec<CabinRecord>> {
        match self.request(&ClientMessage::find_passengers(name)).await? {
            DaemonMessage::CabinList { cabins } => Ok(cabins),
            other => Err(unexpected("find_passengers", &other)),
        }
    }

    /// Ship-wide expense total.
    pub async fn total(&mut self) -> Result<Money> {
        match self.request(&ClientMessage::total_expenses()).await? {
            DaemonMessage::TotalExpenses { total } => Ok(total),
            other => Err(unexpected("total_expenses", &other)),
        }
    }

    /// Every seated passenger sorted by surname then first name.
    pub async fn roster(&mut self) -> Result<Vec<PassengerRecord>> {
        match self.request(&ClientMessage::ordered_passengers()).await? {
            DaemonMessage::PassengerList { passengers } => Ok(passengers),
            other => Err(unexpected("ordered_passengers", &other)),
        }
    }

    /// Charges an amount to one passenger; returns the status line.
    pub async fn charge(
        &mut self,
        cabin_number: i64,
        passenger_index: usize,
        amount: Money,
    ) -> Result<String> {
        self.expect_status(
            "charge_expense",
            ClientMessage::charge_expense(cabin_number, passenger_index, amount),
        )
        .await
    }

    /// Waiting-list guests, head first.
    pub async fn waiting_list(&mut self) -> Result<Vec<String>> {
        match self.request(&ClientMessage::waiting_list()).await? {
            DaemonMessage::WaitingList { guests } => Ok(guests),
            other => Err(unexpected("waiting_list", &other)),
        }
    }

    /// Appends a guest to the waiting list; returns the status line.
    pub async fn add_to_waiting_list(&mut self, guest_name: &str) -> Result<String> {
        self.expect_status("add_to_waiting_list", ClientMessage::add_to_waiting_list(guest_name))
            .await
    }

    /// Replaces all cabin state with an exported snapshot.
    pub async fn load_cabins(&mut self, cabins: serde_json::Value) -> Result<String> {
        self.expect_status("load_cabins", ClientMessage::load_cabins(cabins))
            .await
    }

    // ------------------------------------------------------------------------
    // Wire
    // ------------------------------------------------------------------------

    async fn expect_status(&mut self, request: &str, message: ClientMessage) -> Result<String> {
        match self.request(&message).await? {
            DaemonMessage::Status { message } => Ok(message),
            other => Err(unexpected(request, &other)),
        }
    }

    async fn send(&mut self, message: &ClientMessage) -> Result<()> {
        let json = serde_json::to_string(message)?;
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        debug!(message_type = ?message.message, "Sent message to daemon");
        Ok(())
    }

    /// Reads the next reply, skipping change pushes.
    async fn recv(&mut self) -> Result<DaemonMessage> {
        loop {
            let mut line = String::new();
            let read = timeout(self.timeout, self.reader.read_line(&mut line))
                .await
                .map_err(|_| CliError::Timeout)??;

            if read == 0 {
                return Err(CliError::DaemonConnection(
                    "daemon closed the connection".to_string(),
                ));
            }

            let message: DaemonMessage = serde_json::from_str(line.trim())?;
            if matches!(message, DaemonMessage::ShipUpdated { .. }) {
                debug!("Skipping change push");
                continue;
            }
            return Ok(message);
        }
    }
}

fn version_mismatch(daemon_version: ProtocolVersion) -> CliError {
    CliError::VersionMismatch {
        client_version: ProtocolVersion::CURRENT.to_string(),
        daemon_version: daemon_version.to_string(),
    }
}

fn unexpected(request: &str, reply: &DaemonMessage) -> CliError {
    CliError::ProtocolError(format!("Unexpected response to {request}: {reply:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.socket_path, PathBuf::from("/tmp/cruise.sock"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_unexpected_names_request() {
        let err = unexpected("total_expenses", &DaemonMessage::pong(1));
        assert!(err.to_string().contains("total_expenses"));
        assert!(err.to_string().contains("Pong"));
    }

    #[tokio::test]
    async fn test_connect_to_missing_socket() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            socket_path: dir.path().join("absent.sock"),
            timeout: Duration::from_millis(200),
        };
        let err = DaemonClient::connect(&config).await.err().unwrap();
        assert!(matches!(err, CliError::DaemonConnection(_)));
        assert!(err.to_string().contains("Is cruised running?"));
    }
}
