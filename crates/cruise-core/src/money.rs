//! Money value object for passenger expenses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Represents a monetary amount in USD.
///
/// Internally stored as whole cents so that summing many small charges
/// never drifts the way floating-point accumulation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    /// Amount in cents (1 USD = 100 cents)
    cents: i64,
}

impl Money {
    const CENTS_PER_DOLLAR: i64 = 100;

    /// Creates Money from a dollar amount, rounded to the nearest cent.
    pub fn from_dollars(dollars: f64) -> Self {
        let cents = (dollars * Self::CENTS_PER_DOLLAR as f64).round() as i64;
        Self { cents }
    }

    /// Creates Money from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a zero Money value.
    pub const fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in dollars as a float.
    pub fn as_dollars(&self) -> f64 {
        self.cents as f64 / Self::CENTS_PER_DOLLAR as f64
    }

    /// Returns the amount in cents.
    pub fn as_cents(&self) -> i64 {
        self.cents
    }

    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Formats the amount the way the console shows revenue, e.g. "$1,234.50".
    pub fn format(&self) -> String {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        let dollars = abs / 100;
        let cents = abs % 100;

        let digits = dollars.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        format!("{sign}${grouped}.{cents:02}")
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            cents: self.cents.saturating_add(other.cents),
        }
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.cents = self.cents.saturating_add(other.cents);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Serialize as a plain dollar number for JSON compatibility
        serializer.serialize_f64(self.as_dollars())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let dollars = f64::deserialize(deserializer)?;
        if !dollars.is_finite() {
            return Err(serde::de::Error::custom("amount must be a finite number"));
        }
        Ok(Money::from_dollars(dollars))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_precision() {
        let total: Money = (0..10).map(|_| Money::from_dollars(0.1)).sum();
        assert_eq!(total.as_cents(), 100);
        assert_eq!(total.as_dollars(), 1.0);
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(Money::zero().format(), "$0.00");
        assert_eq!(Money::from_dollars(0.35).format(), "$0.35");
        assert_eq!(Money::from_dollars(12.5).format(), "$12.50");
        assert_eq!(Money::from_dollars(1234.5).format(), "$1,234.50");
        assert_eq!(Money::from_cents(123_456_789).format(), "$1,234,567.89");
        assert_eq!(Money::from_cents(-250).format(), "-$2.50");
    }

    #[test]
    fn test_money_serializes_as_number() {
        let json = serde_json::to_string(&Money::from_dollars(42.75)).unwrap();
        assert_eq!(json, "42.75");

        let parsed: Money = serde_json::from_str("19.99").unwrap();
        assert_eq!(parsed.as_cents(), 1999);
    }

    #[test]
    fn test_money_zero_and_sign() {
        assert!(Money::zero().is_zero());
        assert!(!Money::from_dollars(0.01).is_zero());
        assert!(Money::from_dollars(-0.01).is_negative());
    }
}
