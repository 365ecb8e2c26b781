//! The ship aggregate: twelve cabins plus the waiting list.
//!
//! `Ship` is a plain synchronous value. It does no locking of its own; the
//! daemon keeps exactly one `Ship` inside its registry actor, which is what
//! makes every operation below atomic with respect to every other.

use std::collections::HashSet;

use tracing::debug;

use crate::cabin::CABIN_COUNT;
use crate::validation::{validate_cabin_assignment, validate_guest_name};
use crate::waiting_list::is_ship_full;
use crate::{
    Cabin, CabinNumber, CabinState, Money, Passenger, PassengerDraft, ShipError, ShipResult,
    WaitingList,
};

/// Result of a successful vacate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacateOutcome {
    /// The cabin that was cleared.
    pub cabin_number: CabinNumber,

    /// How many passenger records were discarded.
    pub passengers_removed: usize,

    /// Guest popped from the head of the waiting list, if there was one.
    ///
    /// The guest is *not* seated. The caller has to follow up with
    /// [`Ship::assign_passengers`] using this name as the booking name; if it
    /// never does, the guest is gone from the list and the cabin stays empty.
    pub next_waiting_guest: Option<String>,
}

/// Aggregate root owning all cabin and waiting-list state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    /// Always `CABIN_COUNT` entries, indexed by cabin number.
    cabins: Vec<Cabin>,
    waiting_list: WaitingList,
}

impl Default for Ship {
    fn default() -> Self {
        Self::new()
    }
}

impl Ship {
    /// Creates a ship with every cabin empty and nobody waiting.
    pub fn new() -> Self {
        Self {
            cabins: CabinNumber::all().map(Cabin::empty).collect(),
            waiting_list: WaitingList::new(),
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// All cabins in ascending cabin-number order.
    pub fn cabins(&self) -> &[Cabin] {
        &self.cabins
    }

    /// Owned copy of all cabins, ascending.
    pub fn get_all_cabins(&self) -> Vec<Cabin> {
        self.cabins.clone()
    }

    /// Looks up one cabin.
    ///
    /// # Errors
    ///
    /// `ShipError::InvalidCabin` when the number is out of range.
    pub fn cabin(&self, cabin_number: i64) -> ShipResult<&Cabin> {
        let number = CabinNumber::new(cabin_number)?;
        self.cabins
            .get(number.index())
            .ok_or(ShipError::InvalidCabin {
                cabin_number,
                max: crate::cabin::MAX_CABIN_NUMBER,
            })
    }

    pub fn waiting_list(&self) -> &WaitingList {
        &self.waiting_list
    }

    /// Number of cabins nobody is booked into.
    pub fn vacancies(&self) -> usize {
        self.cabins.iter().filter(|c| !c.is_occupied()).count()
    }

    pub fn is_full(&self) -> bool {
        is_ship_full(self)
    }

    fn cabin_mut(&mut self, number: CabinNumber) -> ShipResult<&mut Cabin> {
        self.cabins
            .get_mut(number.index())
            .ok_or(ShipError::InvalidCabin {
                cabin_number: i64::from(number.get()),
                max: crate::cabin::MAX_CABIN_NUMBER,
            })
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Seats a party in an empty cabin.
    ///
    /// Names are stored trimmed and every passenger starts with zero expenses.
    /// Nothing is taken from the waiting list.
    ///
    /// # Errors
    ///
    /// - `ShipError::InvalidCabin` if the number is out of range
    /// - `ShipError::CabinOccupied` if the cabin has passengers, whatever the payload
    /// - `ShipError::Validation` if the booking name or passengers are bad
    pub fn assign_passengers(
        &mut self,
        cabin_number: i64,
        cabin_name: &str,
        passengers: Vec<Passenger>,
    ) -> ShipResult<&Cabin> {
        let number = CabinNumber::new(cabin_number)?;
        self.ensure_vacant(number)?;

        validate_cabin_assignment(cabin_number, cabin_name, &passengers)?;

        let passengers: Vec<Passenger> = passengers
            .iter()
            .map(|p| p.trimmed().with_expenses(Money::zero()))
            .collect();
        let count = passengers.len();

        let cabin = self.cabin_mut(number)?;
        cabin.replace_state(CabinState::Occupied {
            name: cabin_name.trim().to_string(),
            passengers,
        });

        debug!(cabin = %number, passengers = count, "Cabin assigned");
        Ok(&*cabin)
    }

    /// Seats a party whose passenger types are still unparsed labels.
    ///
    /// Range and occupancy are checked before any label is parsed, so an
    /// occupied cabin reports `CabinOccupied` whatever the payload holds.
    ///
    /// # Errors
    ///
    /// As [`Self::assign_passengers`], plus `ShipError::Validation` for a type
    /// that is not ADULT or CHILD.
    pub fn assign_drafts(
        &mut self,
        cabin_number: i64,
        cabin_name: &str,
        drafts: &[PassengerDraft],
    ) -> ShipResult<&Cabin> {
        let number = CabinNumber::new(cabin_number)?;
        self.ensure_vacant(number)?;

        let passengers = drafts
            .iter()
            .map(PassengerDraft::parse)
            .collect::<ShipResult<Vec<_>>>()?;
        self.assign_passengers(cabin_number, cabin_name, passengers)
    }

    fn ensure_vacant(&self, number: CabinNumber) -> ShipResult<()> {
        let occupied = self
            .cabins
            .get(number.index())
            .is_some_and(Cabin::is_occupied);
        if occupied {
            return Err(ShipError::CabinOccupied {
                cabin_number: number.get(),
            });
        }
        Ok(())
    }

    /// Empties a cabin and pops the next waiting guest, if any.
    ///
    /// # Errors
    ///
    /// - `ShipError::InvalidCabin` if the number is out of range
    /// - `ShipError::CabinAlreadyEmpty` if nobody is in the cabin; a repeated
    ///   vacate is rejected rather than treated as a no-op
    pub fn vacate_cabin(&mut self, cabin_number: i64) -> ShipResult<VacateOutcome> {
        let number = CabinNumber::new(cabin_number)?;
        let cabin = self.cabin_mut(number)?;

        if !cabin.is_occupied() {
            return Err(ShipError::CabinAlreadyEmpty {
                cabin_number: number.get(),
            });
        }

        let passengers_removed = match cabin.replace_state(CabinState::Empty) {
            CabinState::Occupied { passengers, .. } => passengers.len(),
            CabinState::Empty => 0,
        };

        let next_waiting_guest = self.waiting_list.pop_next();

        debug!(
            cabin = %number,
            passengers_removed,
            next_guest = ?next_waiting_guest,
            "Cabin vacated"
        );

        Ok(VacateOutcome {
            cabin_number: number,
            passengers_removed,
            next_waiting_guest,
        })
    }

    /// Appends a guest to the waiting list and returns the new list length.
    ///
    /// # Errors
    ///
    /// - `ShipError::ShipNotFull` if any cabin is free (checked first)
    /// - `ShipError::Validation` if the name is blank
    pub fn add_to_waiting_list(&mut self, name: &str) -> ShipResult<usize> {
        if !self.is_full() {
            return Err(ShipError::ShipNotFull {
                vacant: self.vacancies(),
            });
        }

        let name = validate_guest_name(name)?;
        debug!(guest = %name, position = self.waiting_list.len() + 1, "Guest added to waiting list");
        self.waiting_list.push(name);

        Ok(self.waiting_list.len())
    }

    /// Adds a charge to one passenger's running expenses and returns their new total.
    ///
    /// # Errors
    ///
    /// - `ShipError::InvalidCabin` if the number is out of range
    /// - `ShipError::CabinAlreadyEmpty` if nobody is in the cabin
    /// - `ShipError::Validation` for a negative amount or an unknown passenger index
    pub fn charge_expense(
        &mut self,
        cabin_number: i64,
        passenger_index: usize,
        amount: Money,
    ) -> ShipResult<Money> {
        let number = CabinNumber::new(cabin_number)?;
        if amount.is_negative() {
            return Err(ShipError::validation("An expense amount cannot be negative."));
        }

        let passengers = self
            .cabin_mut(number)?
            .passengers_mut()
            .ok_or(ShipError::CabinAlreadyEmpty {
                cabin_number: number.get(),
            })?;

        let count = passengers.len();
        let passenger = passengers.get_mut(passenger_index).ok_or_else(|| {
            ShipError::validation(format!(
                "Cabin {number} has no passenger #{passenger_index} (it has {count})."
            ))
        })?;

        passenger.expenses += amount;
        debug!(cabin = %number, passenger_index, amount = %amount, "Expense charged");
        Ok(passenger.expenses)
    }

    /// Replaces all twelve cabins at once.
    ///
    /// The whole list is checked before anything is written, so a failure
    /// leaves the current cabins untouched. The waiting list is not affected.
    ///
    /// # Errors
    ///
    /// `ShipError::Validation` unless there are exactly twelve cabins with
    /// distinct numbers and every occupied cabin passes assignment validation.
    pub fn load_snapshot(&mut self, cabins: Vec<Cabin>) -> ShipResult<()> {
        if cabins.len() != CABIN_COUNT {
            return Err(ShipError::validation(format!(
                "A snapshot must contain exactly {CABIN_COUNT} cabins (got {}).",
                cabins.len()
            )));
        }

        let mut seen = HashSet::with_capacity(CABIN_COUNT);
        for cabin in &cabins {
            if !seen.insert(cabin.number()) {
                return Err(ShipError::validation(format!(
                    "Cabin {} appears more than once in the snapshot.",
                    cabin.number()
                )));
            }
            if let CabinState::Occupied { name, passengers } = cabin.state() {
                validate_cabin_assignment(i64::from(cabin.number().get()), name, passengers)?;
            }
        }

        let mut replacement = cabins;
        replacement.sort_by_key(Cabin::number);
        for cabin in &mut replacement {
            if let CabinState::Occupied { name, passengers } = cabin.state() {
                let trimmed = CabinState::Occupied {
                    name: name.trim().to_string(),
                    passengers: passengers.iter().map(Passenger::trimmed).collect(),
                };
                cabin.replace_state(trimmed);
            }
        }

        self.cabins = replacement;
        debug!(occupied = CABIN_COUNT - self.vacancies(), "Snapshot loaded");
        Ok(())
    }
}
