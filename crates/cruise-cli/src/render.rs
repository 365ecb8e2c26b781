//! Plain-text rendering of daemon replies.
//!
//! Output is meant for a terminal or a pipe: fixed-width columns, no colour,
//! one trailing newline per row.

use std::fmt::Write;

use cruise_core::Money;
use cruise_protocol::{CabinRecord, PassengerRecord};

/// Renders cabins as a table, one row per passenger.
///
/// An empty cabin (the `"e"` marker) gets a single `(empty)` row. Each
/// occupied cabin ends with a row totalling its passengers' expenses.
pub fn cabins(records: &[CabinRecord]) -> String {
    if records.is_empty() {
        return "No matching cabins.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:<6} {:<24} {:<28} {:<6} {:>12}", "CABIN", "NAME", "PASSENGER", "TYPE", "EXPENSES");

    for record in records {
        if record.is_empty_marker() {
            let _ = writeln!(out, "{:<6} {:<24}", record.cabin_number, "(empty)");
            continue;
        }

        let mut first = true;
        for passenger in &record.passengers {
            let (number, name) = if first {
                (record.cabin_number.to_string(), record.cabin_name.as_str())
            } else {
                (String::new(), "")
            };
            first = false;
            let _ = writeln!(
                out,
                "{:<6} {:<24} {:<28} {:<6} {:>12}",
                number,
                truncate(name, 24),
                truncate(&full_name(passenger), 28),
                passenger.passenger_type,
                money(passenger.expenses)
            );
        }

        let cabin_total: Money = record
            .passengers
            .iter()
            .map(|p| Money::from_dollars(p.expenses))
            .sum();
        let _ = writeln!(
            out,
            "{:<6} {:<24} {:<28} {:<6} {:>12}",
            "",
            "",
            "Cabin total",
            "",
            cabin_total.format()
        );
    }
    out
}

/// Renders the alphabetical roster.
pub fn roster(passengers: &[PassengerRecord]) -> String {
    if passengers.is_empty() {
        return "No passengers aboard.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:<16} {:<16} {:<6} {:>12}", "SURNAME", "FIRST NAME", "TYPE", "EXPENSES");
    for p in passengers {
        let _ = writeln!(
            out,
            "{:<16} {:<16} {:<6} {:>12}",
            truncate(&p.surname, 16),
            truncate(&p.first_name, 16),
            p.passenger_type,
            money(p.expenses)
        );
    }
    out
}

/// Renders the waiting list, numbered from the head.
pub fn waiting_list(guests: &[String]) -> String {
    if guests.is_empty() {
        return "The waiting list is empty.\n".to_string();
    }

    guests
        .iter()
        .enumerate()
        .map(|(i, guest)| format!("{:>3}. {guest}\n", i + 1))
        .collect()
}

pub fn total(amount: Money) -> String {
    format!("Total expenses: {}\n", amount.format())
}

fn money(dollars: f64) -> String {
    Money::from_dollars(dollars).format()
}

fn full_name(p: &PassengerRecord) -> String {
    format!("{} {}", p.first_name, p.surname)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
