//! Revenue totals and the alphabetical passenger roster.

use crate::{Cabin, Money, Passenger, Ship};

/// Sum of expenses over one cabin's passengers; zero for an empty cabin.
pub fn cabin_total(cabin: &Cabin) -> Money {
    cabin.passengers().iter().map(|p| p.expenses).sum()
}

/// Sum of every seated passenger's expenses across the ship.
pub fn total_expenses(ship: &Ship) -> Money {
    ship.cabins().iter().map(cabin_total).sum()
}

/// Every seated passenger, sorted by surname then first name.
///
/// The sort is stable, so passengers with identical names keep cabin order.
pub fn ordered_passengers(ship: &Ship) -> Vec<Passenger> {
    let mut passengers: Vec<Passenger> = ship
        .cabins()
        .iter()
        .flat_map(|cabin| cabin.passengers().iter().cloned())
        .collect();

    passengers.sort_by(|a, b| {
        a.surname
            .cmp(&b.surname)
            .then_with(|| a.first_name.cmp(&b.first_name))
    });
    passengers
}
