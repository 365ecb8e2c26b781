//! Client interface for the registry actor.
//!
//! `RegistryHandle` is cheap to clone and shared by every connection task.
//! Each method sends one command and awaits its oneshot reply; a stopped
//! actor surfaces as `RegistryError::ChannelClosed`.

use tokio::sync::{broadcast, mpsc, oneshot};

use cruise_core::{Cabin, Money, Passenger, PassengerDraft, VacateOutcome};

use super::commands::{RegistryCommand, RegistryError, ShipEvent};

// ============================================================================
// Registry Handle
// ============================================================================

/// Handle for interacting with the registry actor.
///
/// ```ignore
/// let handle = spawn_registry();
/// handle.assign_passengers(3, "Smith Family".into(), passengers).await?;
/// let outcome = handle.vacate_cabin(3).await?;
/// ```
#[derive(Clone)]
pub struct RegistryHandle {
    sender: mpsc::Sender<RegistryCommand>,
    event_sender: broadcast::Sender<ShipEvent>,
}

impl RegistryHandle {
    pub fn new(
        sender: mpsc::Sender<RegistryCommand>,
        event_sender: broadcast::Sender<ShipEvent>,
    ) -> Self {
        Self {
            sender,
            event_sender,
        }
    }

    /// Sends a command built around a fresh reply channel and awaits the reply.
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RegistryCommand,
    ) -> Result<T, RegistryError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(build(tx))
            .await
            .map_err(|_| RegistryError::ChannelClosed)?;

        rx.await.map_err(|_| RegistryError::ChannelClosed)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// All twelve cabins, ascending.
    ///
    /// # Errors
    ///
    /// `RegistryError::ChannelClosed` if the actor has shut down.
    pub async fn get_all_cabins(&self) -> Result<Vec<Cabin>, RegistryError> {
        self.request(|respond_to| RegistryCommand::GetAllCabins { respond_to })
            .await
    }

    pub async fn get_cabin(&self, cabin_number: i64) -> Result<Cabin, RegistryError> {
        self.request(|respond_to| RegistryCommand::GetCabin {
            cabin_number,
            respond_to,
        })
        .await?
    }

    /// Waiting guests, head first.
    pub async fn get_waiting_list(&self) -> Result<Vec<String>, RegistryError> {
        self.request(|respond_to| RegistryCommand::GetWaitingList { respond_to })
            .await
    }

    /// Cabins whose booking name or passengers match `query`.
    ///
    /// A blank query matches nothing.
    pub async fn find_cabins(&self, query: String) -> Result<Vec<Cabin>, RegistryError> {
        self.request(|respond_to| RegistryCommand::FindCabins { query, respond_to })
            .await
    }

    pub async fn total_expenses(&self) -> Result<Money, RegistryError> {
        self.request(|respond_to| RegistryCommand::TotalExpenses { respond_to })
            .await
    }

    /// Seated passengers sorted by surname, then first name.
    pub async fn ordered_passengers(&self) -> Result<Vec<Passenger>, RegistryError> {
        self.request(|respond_to| RegistryCommand::OrderedPassengers { respond_to })
            .await
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Seats a party in an empty cabin and returns the stored cabin.
    ///
    /// # Errors
    ///
    /// - `ShipError::InvalidCabin` if the number is out of range
    /// - `ShipError::CabinOccupied` if someone is already in the cabin
    /// - `ShipError::Validation` for a bad booking name or passenger list
    /// - `RegistryError::ChannelClosed` if the actor has shut down
    pub async fn assign_passengers(
        &self,
        cabin_number: i64,
        cabin_name: String,
        passengers: Vec<Passenger>,
    ) -> Result<Cabin, RegistryError> {
        let drafts = passengers.iter().map(PassengerDraft::from).collect();
        self.assign_drafts(cabin_number, cabin_name, drafts).await
    }

    /// Seats a party straight from a request body, type labels unparsed.
    ///
    /// # Errors
    ///
    /// As [`Self::assign_passengers`]; an unknown type is a
    /// `ShipError::Validation` reported only once the cabin is known to be free.
    pub async fn assign_drafts(
        &self,
        cabin_number: i64,
        cabin_name: String,
        passengers: Vec<PassengerDraft>,
    ) -> Result<Cabin, RegistryError> {
        self.request(|respond_to| RegistryCommand::AssignPassengers {
            cabin_number,
            cabin_name,
            passengers,
            respond_to,
        })
        .await?
    }

    /// Empties a cabin and pops the next waiting guest.
    ///
    /// The popped guest is not seated; follow up with [`Self::assign_passengers`].
    ///
    /// # Errors
    ///
    /// - `ShipError::InvalidCabin` if the number is out of range
    /// - `ShipError::CabinAlreadyEmpty` if nobody is in the cabin
    /// - `RegistryError::ChannelClosed` if the actor has shut down
    pub async fn vacate_cabin(&self, cabin_number: i64) -> Result<VacateOutcome, RegistryError> {
        self.request(|respond_to| RegistryCommand::VacateCabin {
            cabin_number,
            respond_to,
        })
        .await?
    }

    /// Appends a guest to the waiting list and returns the new length.
    ///
    /// # Errors
    ///
    /// - `ShipError::ShipNotFull` unless every cabin is occupied
    /// - `ShipError::Validation` for a blank name
    /// - `RegistryError::ChannelClosed` if the actor has shut down
    pub async fn add_to_waiting_list(&self, guest_name: String) -> Result<usize, RegistryError> {
        self.request(|respond_to| RegistryCommand::AddToWaitingList {
            guest_name,
            respond_to,
        })
        .await?
    }

    /// Charges one seated passenger and returns their new running total.
    pub async fn charge_expense(
        &self,
        cabin_number: i64,
        passenger_index: usize,
        amount: Money,
    ) -> Result<Money, RegistryError> {
        self.request(|respond_to| RegistryCommand::ChargeExpense {
            cabin_number,
            passenger_index,
            amount,
            respond_to,
        })
        .await?
    }

    /// Replaces all twelve cabins. On error the current cabins are untouched.
    pub async fn load_snapshot(&self, cabins: Vec<Cabin>) -> Result<(), RegistryError> {
        self.request(|respond_to| RegistryCommand::LoadSnapshot { cabins, respond_to })
            .await?
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Receiver for events published after successful mutations.
    pub fn subscribe(&self) -> broadcast::Receiver<ShipEvent> {
        self.event_sender.subscribe()
    }

    /// Returns `true` while the actor's command channel is open.
    pub fn is_connected(&self) -> bool {
        !self.sender.is_closed()
    }
}
