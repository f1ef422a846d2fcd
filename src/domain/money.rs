//! Exact, non-negative ticket prices.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A price in minor currency units (cents).
///
/// Stored as an unsigned integer so a price can never be negative and
/// never accumulates floating-point error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Creates a price from cents.
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Returns the price in cents.
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Converts a signed storage value, rejecting negatives.
    #[must_use]
    pub fn from_storage(cents: i64) -> Option<Self> {
        u64::try_from(cents).ok().map(Self)
    }
}

/// Renders as a two-decimal string (`"50.00"`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_pads_cents() {
        assert_eq!(Money::from_cents(5000).to_string(), "50.00");
        assert_eq!(Money::from_cents(1205).to_string(), "12.05");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn negative_storage_values_are_rejected() {
        assert_eq!(Money::from_storage(-1), None);
        assert_eq!(Money::from_storage(250), Some(Money::from_cents(250)));
    }
}
