//! Registry actor - owns the ship and processes commands one at a time.
//!
//! Every read and mutation is handled to completion before the next command
//! is taken off the channel, so no two vacates can pop the same waiting
//! guest and no assignment can interleave with a bulk load.
//!
//! # Panic-Free Guarantees
//!
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Reply send failures are ignored; the caller may have given up
//! - Event publish failures are ignored; there may be no subscribers

use chrono::Utc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use cruise_core::{
    find_cabins_by_name, ordered_passengers, total_expenses, Cabin, Money, PassengerDraft, Ship,
    VacateOutcome,
};
use cruise_protocol::ShipChange;

use super::commands::{RegistryCommand, RegistryError, ShipEvent};

// ============================================================================
// Registry Actor
// ============================================================================

pub struct RegistryActor {
    receiver: mpsc::Receiver<RegistryCommand>,

    /// The one and only ship. Cabins and the waiting list live together so a
    /// vacate and its pop are a single step.
    ship: Ship,

    event_publisher: broadcast::Sender<ShipEvent>,
}

impl RegistryActor {
    pub fn new(
        receiver: mpsc::Receiver<RegistryCommand>,
        event_publisher: broadcast::Sender<ShipEvent>,
    ) -> Self {
        Self {
            receiver,
            ship: Ship::new(),
            event_publisher,
        }
    }

    /// Runs until every sender has been dropped.
    pub async fn run(mut self) {
        info!("Registry actor starting");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!(
            occupied = self.ship.cabins().len() - self.ship.vacancies(),
            waiting = self.ship.waiting_list().len(),
            "Registry actor stopped"
        );
    }

    fn handle_command(&mut self, cmd: RegistryCommand) {
        match cmd {
            RegistryCommand::GetAllCabins { respond_to } => {
                let _ = respond_to.send(self.ship.get_all_cabins());
            }
            RegistryCommand::GetCabin {
                cabin_number,
                respond_to,
            } => {
                let result = self
                    .ship
                    .cabin(cabin_number)
                    .cloned()
                    .map_err(RegistryError::from);
                let _ = respond_to.send(result);
            }
            RegistryCommand::AssignPassengers {
                cabin_number,
                cabin_name,
                passengers,
                respond_to,
            } => {
                let result = self.handle_assign(cabin_number, &cabin_name, passengers);
                let _ = respond_to.send(result);
            }
            RegistryCommand::VacateCabin {
                cabin_number,
                respond_to,
            } => {
                let result = self.handle_vacate(cabin_number);
                let _ = respond_to.send(result);
            }
            RegistryCommand::AddToWaitingList {
                guest_name,
                respond_to,
            } => {
                let result = self.handle_add_to_waiting_list(&guest_name);
                let _ = respond_to.send(result);
            }
            RegistryCommand::GetWaitingList { respond_to } => {
                let _ = respond_to.send(self.ship.waiting_list().get_all());
            }
            RegistryCommand::FindCabins { query, respond_to } => {
                let found = find_cabins_by_name(&self.ship, &query);
                debug!(query = %query, matches = found.len(), "Cabin search");
                let _ = respond_to.send(found);
            }
            RegistryCommand::TotalExpenses { respond_to } => {
                let _ = respond_to.send(total_expenses(&self.ship));
            }
            RegistryCommand::OrderedPassengers { respond_to } => {
                let _ = respond_to.send(ordered_passengers(&self.ship));
            }
            RegistryCommand::ChargeExpense {
                cabin_number,
                passenger_index,
                amount,
                respond_to,
            } => {
                let result = self.handle_charge_expense(cabin_number, passenger_index, amount);
                let _ = respond_to.send(result);
            }
            RegistryCommand::LoadSnapshot { cabins, respond_to } => {
                let result = self.handle_load_snapshot(cabins);
                let _ = respond_to.send(result);
            }
        }
    }

    // ========================================================================
    // Command Handlers
    // ========================================================================

    fn handle_assign(
        &mut self,
        cabin_number: i64,
        cabin_name: &str,
        passengers: Vec<PassengerDraft>,
    ) -> Result<Cabin, RegistryError> {
        let cabin = match self.ship.assign_drafts(cabin_number, cabin_name, &passengers) {
            Ok(cabin) => cabin.clone(),
            Err(e) => {
                warn!(cabin = cabin_number, error = %e, "Assignment rejected");
                return Err(e.into());
            }
        };

        info!(
            cabin = %cabin.number(),
            name = cabin.name().unwrap_or_default(),
            passengers = cabin.passengers().len(),
            "Cabin assigned"
        );

        self.publish(ShipChange::CabinAssigned {
            cabin_number: cabin.number().get(),
        });
        Ok(cabin)
    }

    fn handle_vacate(&mut self, cabin_number: i64) -> Result<VacateOutcome, RegistryError> {
        let outcome = self.ship.vacate_cabin(cabin_number).map_err(|e| {
            warn!(cabin = cabin_number, error = %e, "Vacate rejected");
            RegistryError::from(e)
        })?;

        info!(
            cabin = %outcome.cabin_number,
            passengers_removed = outcome.passengers_removed,
            next_guest = ?outcome.next_waiting_guest,
            "Cabin vacated"
        );

        self.publish(ShipChange::CabinVacated {
            cabin_number: outcome.cabin_number.get(),
            next_waiting_guest: outcome.next_waiting_guest.clone(),
        });
        Ok(outcome)
    }

    fn handle_add_to_waiting_list(&mut self, guest_name: &str) -> Result<usize, RegistryError> {
        let length = self.ship.add_to_waiting_list(guest_name).map_err(|e| {
            warn!(guest = %guest_name, error = %e, "Waiting-list add rejected");
            RegistryError::from(e)
        })?;

        info!(guest = %guest_name.trim(), position = length, "Guest added to waiting list");
        self.publish(ShipChange::WaitingListChanged { length });
        Ok(length)
    }

    fn handle_charge_expense(
        &mut self,
        cabin_number: i64,
        passenger_index: usize,
        amount: Money,
    ) -> Result<Money, RegistryError> {
        let total = self
            .ship
            .charge_expense(cabin_number, passenger_index, amount)
            .map_err(|e| {
                warn!(cabin = cabin_number, passenger_index, error = %e, "Charge rejected");
                RegistryError::from(e)
            })?;

        info!(
            cabin = cabin_number,
            passenger_index,
            amount = %amount,
            total = %total,
            "Expense charged"
        );

        // Range already checked by the ship
        let cabin_number = u8::try_from(cabin_number).unwrap_or_default();
        self.publish(ShipChange::ExpenseCharged {
            cabin_number,
            passenger_index,
        });
        Ok(total)
    }

    fn handle_load_snapshot(&mut self, cabins: Vec<Cabin>) -> Result<(), RegistryError> {
        self.ship.load_snapshot(cabins).map_err(|e| {
            warn!(error = %e, "Snapshot rejected, cabins unchanged");
            RegistryError::from(e)
        })?;

        info!(
            occupied = self.ship.cabins().len() - self.ship.vacancies(),
            "Snapshot loaded"
        );
        self.publish(ShipChange::SnapshotLoaded);
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn publish(&self, change: ShipChange) {
        let _ = self.event_publisher.send(ShipEvent {
            change,
            cabins: self.ship.get_all_cabins(),
            waiting_list: self.ship.waiting_list().get_all(),
            at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cruise_core::{Passenger, PassengerType, ShipError};
    use tokio::sync::oneshot;

    fn create_actor() -> (mpsc::Sender<RegistryCommand>, RegistryActor, broadcast::Receiver<ShipEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = broadcast::channel(16);
        let actor = RegistryActor::new(cmd_rx, event_tx);
        (cmd_tx, actor, event_rx)
    }

    fn party(surname: &str) -> Vec<Passenger> {
        vec![Passenger::new("Ann", surname, PassengerType::Adult)]
    }

    async fn pump(actor: &mut RegistryActor) {
        if let Some(cmd) = actor.receiver.recv().await {
            actor.handle_command(cmd);
        }
    }

    #[tokio::test]
    async fn test_assign_publishes_event() {
        let (cmd_tx, mut actor, mut event_rx) = create_actor();
        let (respond_tx, respond_rx) = oneshot::channel();

        cmd_tx
            .send(RegistryCommand::AssignPassengers {
                cabin_number: 3,
                cabin_name: "Smith Family".to_string(),
                passengers: party("Smith").iter().map(PassengerDraft::from).collect(),
                respond_to: respond_tx,
            })
            .await
            .unwrap();
        pump(&mut actor).await;

        let cabin = respond_rx.await.unwrap().unwrap();
        assert_eq!(cabin.name(), Some("Smith Family"));

        let event = event_rx.try_recv().unwrap();
        assert_eq!(event.change, ShipChange::CabinAssigned { cabin_number: 3 });
        assert!(event.cabins[3].is_occupied());
    }

    #[tokio::test]
    async fn test_rejected_mutation_publishes_nothing() {
        let (cmd_tx, mut actor, mut event_rx) = create_actor();
        let (respond_tx, respond_rx) = oneshot::channel();

        cmd_tx
            .send(RegistryCommand::VacateCabin {
                cabin_number: 5,
                respond_to: respond_tx,
            })
            .await
            .unwrap();
        pump(&mut actor).await;

        let result = respond_rx.await.unwrap();
        assert_eq!(
            result,
            Err(RegistryError::Ship(ShipError::CabinAlreadyEmpty { cabin_number: 5 }))
        );
        assert!(event_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_vacate_pops_waiting_guest() {
        let (cmd_tx, mut actor, _event_rx) = create_actor();

        for n in 0..12 {
            actor
                .ship
                .assign_passengers(n, &format!("Party {n}"), party("Smith"))
                .unwrap();
        }
        actor.ship.add_to_waiting_list("Jones").unwrap();

        let (respond_tx, respond_rx) = oneshot::channel();
        cmd_tx
            .send(RegistryCommand::VacateCabin {
                cabin_number: 3,
                respond_to: respond_tx,
            })
            .await
            .unwrap();
        pump(&mut actor).await;

        let outcome = respond_rx.await.unwrap().unwrap();
        assert_eq!(outcome.next_waiting_guest.as_deref(), Some("Jones"));
        assert!(actor.ship.waiting_list().is_empty());
        assert!(!actor.ship.cabin(3).unwrap().is_occupied());
    }

    #[tokio::test]
    async fn test_charge_expense_updates_total() {
        let (cmd_tx, mut actor, mut event_rx) = create_actor();
        actor.ship.assign_passengers(2, "Browns", party("Brown")).unwrap();

        let (respond_tx, respond_rx) = oneshot::channel();
        cmd_tx
            .send(RegistryCommand::ChargeExpense {
                cabin_number: 2,
                passenger_index: 0,
                amount: Money::from_dollars(40.0),
                respond_to: respond_tx,
            })
            .await
            .unwrap();
        pump(&mut actor).await;

        assert_eq!(respond_rx.await.unwrap().unwrap(), Money::from_dollars(40.0));
        assert_eq!(
            event_rx.try_recv().unwrap().change,
            ShipChange::ExpenseCharged {
                cabin_number: 2,
                passenger_index: 0
            }
        );
        assert_eq!(total_expenses(&actor.ship), Money::from_dollars(40.0));
    }

    #[tokio::test]
    async fn test_run_exits_when_senders_dropped() {
        let (cmd_tx, actor, _event_rx) = create_actor();
        let task = tokio::spawn(actor.run());
        drop(cmd_tx);
        task.await.unwrap();
    }
}
