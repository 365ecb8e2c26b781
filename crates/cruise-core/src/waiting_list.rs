//! FIFO waiting list of prospective guests.

use std::collections::VecDeque;

use crate::Ship;

/// Ordered queue of guest names, head first.
///
/// Duplicate names are allowed. The list is only ever appended to through
/// [`Ship::add_to_waiting_list`], which enforces the ship-full gate, and only
/// ever drained by [`Ship::vacate_cabin`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaitingList {
    guests: VecDeque<String>,
}

impl WaitingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.guests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guests.is_empty()
    }

    /// The guest who would be offered the next vacated cabin.
    pub fn peek_next(&self) -> Option<&str> {
        self.guests.front().map(String::as_str)
    }

    /// Removes and returns the head of the queue.
    pub(crate) fn pop_next(&mut self) -> Option<String> {
        self.guests.pop_front()
    }

    /// Appends an already-validated name at the tail.
    pub(crate) fn push(&mut self, name: String) {
        self.guests.push_back(name);
    }

    /// Full queue, head first.
    pub fn get_all(&self) -> Vec<String> {
        self.guests.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.guests.iter().map(String::as_str)
    }
}

/// True when every cabin on the ship is occupied.
pub fn is_ship_full(ship: &Ship) -> bool {
    ship.cabins().iter().all(|cabin| cabin.is_occupied())
}
