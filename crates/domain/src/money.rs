// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// A monetary amount in minor units (cents).
///
/// Amounts are exact integers; all arithmetic is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Adds two amounts.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AmountOverflow` on overflow.
    pub fn checked_add(self, other: Self) -> Result<Self, DomainError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(DomainError::AmountOverflow)
    }

    /// Multiplies the amount by a quantity.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AmountOverflow` on overflow.
    pub fn checked_mul(self, quantity: u32) -> Result<Self, DomainError> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Self)
            .ok_or(DomainError::AmountOverflow)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_cents() {
        assert_eq!(Money::from_cents(4550).to_string(), "45.50");
        assert_eq!(Money::from_cents(1000).to_string(), "10.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-125).to_string(), "-1.25");
    }

    #[test]
    fn test_fractional_multiplication_is_exact() {
        let unit = Money::from_cents(2275);
        assert_eq!(unit.checked_mul(2).unwrap(), Money::from_cents(4550));
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(
            Money::from_cents(i64::MAX).checked_mul(2),
            Err(DomainError::AmountOverflow)
        );
        assert_eq!(
            Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)),
            Err(DomainError::AmountOverflow)
        );
    }
}
