//! Connection handler for individual console connections.
//!
//! Each connection gets its own `ConnectionHandler` that:
//! - Performs protocol version negotiation
//! - Turns each request line into a registry call
//! - Writes exactly one response line per request (pushes aside)
//!
//! Ship errors never close a connection; they are answered with an
//! `error { message, code }` line and the loop continues.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use cruise_core::ShipError;
use cruise_protocol::wire::{cabin_records, passenger_records};
use cruise_protocol::{snapshot, status, ClientMessage, DaemonMessage, MessageType, ProtocolVersion};

use crate::registry::{RegistryError, RegistryHandle};

/// Type alias for subscriber writer handle
pub type SubscriberWriter = Arc<Mutex<BufWriter<OwnedWriteHalf>>>;

/// Type alias for the subscribers map, keyed by client id
pub type SubscribersMap = Arc<RwLock<HashMap<String, SubscriberWriter>>>;

/// Maximum number of concurrent subscribed consoles
pub const MAX_SUBSCRIBERS: usize = 10;

/// Maximum request line size (1 MB); a full snapshot is a few KB
const MAX_MESSAGE_SIZE: usize = 1_048_576;

/// Read timeout for idle connections (5 minutes)
const READ_TIMEOUT: Duration = Duration::from_secs(300);

/// Write timeout (10 seconds)
pub(crate) const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Reply to a blank search, checked before the registry is asked.
pub const EMPTY_SEARCH_MESSAGE: &str = "Please enter a name to search.";

type ClientId = String;

pub struct ConnectionHandler {
    reader: BufReader<OwnedReadHalf>,

    /// Shared with the event broadcaster while subscribed
    writer: SubscriberWriter,

    registry: RegistryHandle,
    subscribers: SubscribersMap,

    /// Assigned after handshake
    client_id: Option<ClientId>,

    connection_number: u64,
}

impl ConnectionHandler {
    pub fn new(
        reader: OwnedReadHalf,
        writer: OwnedWriteHalf,
        registry: RegistryHandle,
        subscribers: SubscribersMap,
        connection_number: u64,
    ) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer: Arc::new(Mutex::new(BufWriter::new(writer))),
            registry,
            subscribers,
            client_id: None,
            connection_number,
        }
    }

    /// Performs the handshake, then serves requests until the client leaves.
    ///
    /// Returns the client id so the server can drop its subscription.
    pub async fn run(mut self) -> Option<ClientId> {
        debug!(connection = self.connection_number, "New client connected");

        if let Err(e) = self.handle_handshake().await {
            warn!(
                connection = self.connection_number,
                error = %e,
                "Handshake failed"
            );
            return None;
        }
        debug!(client_id = ?self.client_id, "Client handshake completed");

        let client_id = self.client_id.clone();

        if let Err(e) = self.process_messages().await {
            debug!(client_id = ?self.client_id, error = %e, "Connection closed");
        }

        debug!(client_id = ?self.client_id, "Client disconnected");
        client_id
    }

    async fn handle_handshake(&mut self) -> Result<(), ConnectionError> {
        let msg = self.read_message().await?;

        let client_version = msg.protocol_version;
        if let Err(e) = ProtocolVersion::CURRENT.check(&client_version) {
            warn!(
                client_version = %client_version,
                server_version = %ProtocolVersion::CURRENT,
                "Protocol version mismatch"
            );
            self.send_message(DaemonMessage::rejected(&e.to_string())).await?;
            return Err(ConnectionError::VersionMismatch {
                client: client_version,
                server: ProtocolVersion::CURRENT,
            });
        }

        match msg.message {
            MessageType::Connect { client_id } => {
                let assigned_id =
                    client_id.unwrap_or_else(|| format!("client-{}", self.connection_number));
                self.client_id = Some(assigned_id.clone());
                self.send_message(DaemonMessage::connected(assigned_id)).await
            }
            other => {
                self.send_message(DaemonMessage::error("Expected Connect message for handshake"))
                    .await?;
                Err(ConnectionError::UnexpectedMessage(format!("{other:?}")))
            }
        }
    }

    async fn process_messages(&mut self) -> Result<(), ConnectionError> {
        loop {
            let msg = match timeout(READ_TIMEOUT, self.read_message()).await {
                Ok(Ok(msg)) => msg,
                Ok(Err(ConnectionError::Eof)) => return Ok(()),
                Ok(Err(e @ ConnectionError::ParseError(_))) => {
                    // A garbled line does not end the session
                    self.send_message(DaemonMessage::error(&e.to_string())).await?;
                    continue;
                }
                Ok(Err(e)) => return Err(e),
                Err(_) => return Err(ConnectionError::Timeout),
            };

            match msg.message {
                MessageType::Disconnect => {
                    debug!(client_id = ?self.client_id, "Client requested disconnect");
                    return Ok(());
                }
                MessageType::Connect { .. } => {
                    self.send_message(DaemonMessage::error("Already connected")).await?;
                }
                MessageType::Subscribe => self.handle_subscribe().await?,
                MessageType::Unsubscribe => self.handle_unsubscribe().await,
                MessageType::Ping { seq } => {
                    self.send_message(DaemonMessage::pong(seq)).await?;
                }
                request => {
                    let reply = match execute(&self.registry, request).await {
                        Ok(reply) => reply,
                        Err(e) => {
                            debug!(client_id = ?self.client_id, code = e.code(), error = %e, "Request failed");
                            DaemonMessage::error_with_code(&e.to_string(), e.code())
                        }
                    };
                    self.send_message(reply).await?;
                }
            }
        }
    }

    async fn handle_subscribe(&mut self) -> Result<(), ConnectionError> {
        let Some(client_id) = self.client_id.clone() else {
            return self
                .send_message(DaemonMessage::error("Must connect before subscribing"))
                .await;
        };

        {
            let mut subs = self.subscribers.write().await;
            if subs.len() >= MAX_SUBSCRIBERS && !subs.contains_key(&client_id) {
                drop(subs);
                return self
                    .send_message(DaemonMessage::error(&format!(
                        "Too many subscribers (max: {MAX_SUBSCRIBERS})"
                    )))
                    .await;
            }
            subs.insert(client_id.clone(), Arc::clone(&self.writer));
        }

        info!(client_id = %client_id, "Client subscribed to ship updates");

        // Initial state
        let reply = match self.registry.get_all_cabins().await {
            Ok(cabins) => DaemonMessage::cabin_list(cabin_records(&cabins)),
            Err(e) => DaemonMessage::error_with_code(&e.to_string(), e.code()),
        };
        self.send_message(reply).await
    }

    async fn handle_unsubscribe(&mut self) {
        if let Some(ref client_id) = self.client_id {
            if self.subscribers.write().await.remove(client_id).is_some() {
                debug!(client_id = %client_id, "Client unsubscribed");
            }
        }
    }

    async fn read_message(&mut self) -> Result<ClientMessage, ConnectionError> {
        let line = read_bounded_line(&mut self.reader, MAX_MESSAGE_SIZE).await?;

        let msg: ClientMessage =
            serde_json::from_slice(&line).map_err(|e| ConnectionError::ParseError(e.to_string()))?;

        debug!(
            client_id = ?self.client_id,
            message_type = ?std::mem::discriminant(&msg.message),
            "Received message"
        );

        Ok(msg)
    }

    async fn send_message(&self, msg: DaemonMessage) -> Result<(), ConnectionError> {
        let json =
            serde_json::to_string(&msg).map_err(|e| ConnectionError::ParseError(e.to_string()))?;
        write_line(&self.writer, &json).await
    }
}

/// Reads one newline-terminated line, buffering at most `max + 1` bytes.
///
/// # Errors
///
/// `Eof` on a closed stream, `MessageTooLarge` once the line exceeds `max`.
async fn read_bounded_line<R>(reader: &mut R, max: usize) -> Result<Vec<u8>, ConnectionError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let limit = u64::try_from(max).unwrap_or(u64::MAX).saturating_add(1);

    let bytes_read = (&mut *reader)
        .take(limit)
        .read_until(b'\n', &mut line)
        .await
        .map_err(|e| ConnectionError::Io(e.to_string()))?;

    if bytes_read == 0 {
        return Err(ConnectionError::Eof);
    }

    if line.len() > max {
        return Err(ConnectionError::MessageTooLarge {
            size: line.len(),
            max,
        });
    }

    Ok(line)
}

/// Runs one ship request against the registry and builds its reply.
///
/// # Errors
///
/// Any `RegistryError`; its display text is the message shown to the user.
pub async fn execute(
    registry: &RegistryHandle,
    request: MessageType,
) -> Result<DaemonMessage, RegistryError> {
    let reply = match request {
        MessageType::ListCabins => {
            let cabins = registry.get_all_cabins().await?;
            DaemonMessage::cabin_list(cabin_records(&cabins))
        }

        MessageType::AssignPassengers {
            cabin_number,
            request,
        } => {
            let drafts = request.to_drafts();
            let cabin = registry
                .assign_drafts(cabin_number, request.cabin_name, drafts)
                .await?;
            DaemonMessage::status(status::assigned(cabin.number(), cabin.passengers().len()))
        }

        MessageType::VacateCabin { cabin_number } => {
            let outcome = registry.vacate_cabin(cabin_number).await?;
            DaemonMessage::Vacated {
                message: status::vacated(&outcome),
                next_waiting_guest: outcome.next_waiting_guest,
            }
        }

        MessageType::FindPassengers { name } => {
            if name.trim().is_empty() {
                return Err(ShipError::validation(EMPTY_SEARCH_MESSAGE).into());
            }
            let cabins = registry.find_cabins(name).await?;
            DaemonMessage::cabin_list(cabin_records(&cabins))
        }

        MessageType::TotalExpenses => DaemonMessage::TotalExpenses {
            total: registry.total_expenses().await?,
        },

        MessageType::OrderedPassengers => {
            let passengers = registry.ordered_passengers().await?;
            DaemonMessage::PassengerList {
                passengers: passenger_records(&passengers),
            }
        }

        MessageType::ChargeExpense {
            cabin_number,
            passenger_index,
            amount,
        } => {
            let total = registry
                .charge_expense(cabin_number, passenger_index, amount)
                .await?;
            DaemonMessage::status(status::expense_charged(
                cabin_number,
                passenger_index,
                amount,
                total,
            ))
        }

        MessageType::WaitingList => DaemonMessage::WaitingList {
            guests: registry.get_waiting_list().await?,
        },

        MessageType::AddToWaitingList { request } => {
            let guest = request.guest_name.trim().to_string();
            let position = registry.add_to_waiting_list(request.guest_name).await?;
            DaemonMessage::status(status::waiting_list_added(&guest, position))
        }

        MessageType::LoadCabins { cabins } => {
            let cabins = snapshot::import_value(cabins)?;
            let occupied = cabins.iter().filter(|c| c.is_occupied()).count();
            registry.load_snapshot(cabins).await?;
            DaemonMessage::status(status::snapshot_loaded(occupied))
        }

        // Session-level messages are answered by the connection itself
        MessageType::Connect { .. }
        | MessageType::Subscribe
        | MessageType::Unsubscribe
        | MessageType::Ping { .. }
        | MessageType::Disconnect => DaemonMessage::error("Unsupported request"),
    };

    Ok(reply)
}

/// Writes one JSON line with the write timeout applied.
pub(crate) async fn write_line(writer: &SubscriberWriter, json: &str) -> Result<(), ConnectionError> {
    let mut writer = writer.lock().await;

    match timeout(WRITE_TIMEOUT, async {
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok::<(), std::io::Error>(())
    })
    .await
    {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ConnectionError::Io(e.to_string())),
        Err(_) => Err(ConnectionError::WriteTimeout),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Protocol version mismatch: client {client}, server {server}")]
    VersionMismatch {
        client: ProtocolVersion,
        server: ProtocolVersion,
    },

    #[error("Unexpected message: {0}")]
    UnexpectedMessage(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Connection closed")]
    Eof,

    #[error("Read timeout")]
    Timeout,

    #[error("Write timeout")]
    WriteTimeout,

    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },
}
