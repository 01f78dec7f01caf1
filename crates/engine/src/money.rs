use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

/// Signed money amount represented as **integer minor units** (pesewas).
///
/// Use this type for **all** monetary values in the engine (prices,
/// discounts, payments) to avoid floating-point drift.
///
/// The value is signed:
/// - positive = a price / an amount received
/// - negative = a correction / decrease
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34 GHS");
/// ```
///
/// The only place a float enters the engine is the vehicle-size multiplier;
/// [`scale`](MoneyCents::scale) applies it and rounds half away from zero at
/// the minor-unit boundary. Percentages ([`percent`](MoneyCents::percent))
/// stay in integer arithmetic.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }

    /// Multiplies by a scalar, rounding half away from zero.
    ///
    /// Used for the vehicle-size multiplier. No validation happens here: a
    /// negative or nonsensical multiplier propagates into the result and
    /// callers must guard upstream.
    #[must_use]
    pub fn scale(self, multiplier: f64) -> MoneyCents {
        MoneyCents((self.0 as f64 * multiplier).round() as i64)
    }

    /// Computes `pct`% of the amount in integer arithmetic, rounding half
    /// away from zero.
    ///
    /// Percentages above 100 are not clamped; callers validate the range.
    #[must_use]
    pub fn percent(self, pct: u8) -> MoneyCents {
        let total = self.0 * i64::from(pct);
        let quotient = total / 100;
        let remainder = total % 100;
        if remainder.abs() * 2 >= 100 {
            MoneyCents(quotient + total.signum())
        } else {
            MoneyCents(quotient)
        }
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let major = abs / 100;
        let minor = abs % 100;
        write!(f, "{sign}{major}.{minor:02} GHS")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 -= rhs.0;
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_ghs() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00 GHS");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01 GHS");
        assert_eq!(MoneyCents::new(10).to_string(), "0.10 GHS");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50 GHS");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50 GHS");
    }

    #[test]
    fn scale_rounds_half_away_from_zero() {
        assert_eq!(MoneyCents::new(100).scale(1.5).cents(), 150);
        assert_eq!(MoneyCents::new(1000).scale(1.25).cents(), 1250);
        // 333 * 1.5 = 499.5 -> 500
        assert_eq!(MoneyCents::new(333).scale(1.5).cents(), 500);
        assert_eq!(MoneyCents::new(-333).scale(1.5).cents(), -500);
        assert_eq!(MoneyCents::new(1000).scale(0.0).cents(), 0);
    }

    #[test]
    fn percent_uses_integer_arithmetic() {
        assert_eq!(MoneyCents::new(150).percent(10).cents(), 15);
        assert_eq!(MoneyCents::new(1000).percent(0).cents(), 0);
        // 15 * 10 / 100 = 1.5 -> 2
        assert_eq!(MoneyCents::new(15).percent(10).cents(), 2);
        assert_eq!(MoneyCents::new(-15).percent(10).cents(), -2);
        assert_eq!(MoneyCents::new(100).percent(100).cents(), 100);
    }
}
