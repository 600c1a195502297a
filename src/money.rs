use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Number of decimal places kept for every amount.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// A signed amount of money counted in minor units (cents).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Smallest representable amount, 0.01.
    pub const EPSILON: Money = Money(1);

    /// Largest amount a single expense may carry: one trillion major units.
    /// Keeps every fold over stored expenses far away from `i64` limits.
    pub const MAX_AMOUNT: Money = Money(100_000_000_000_000);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Rounds half away from zero to two decimal places. `None` when the
    /// value doesn't fit.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        let minor = (value * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        minor.to_i64().map(Self)
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// True when the amount is within [`Money::EPSILON`] of zero.
    pub fn is_negligible(self) -> bool {
        self.0.unsigned_abs() <= Self::EPSILON.0.unsigned_abs()
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&self.to_decimal(), serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Money::from_decimal(value)
            .ok_or_else(|| de::Error::custom(format!("amount {value} is out of range")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_decimal_rounds_half_away_from_zero() {
        assert_eq!(Money::from_decimal(dec!(12.345)), Some(Money::from_minor(1235)));
        assert_eq!(Money::from_decimal(dec!(-12.345)), Some(Money::from_minor(-1235)));
        assert_eq!(Money::from_decimal(dec!(0.004)), Some(Money::ZERO));
    }

    #[test]
    fn test_display_keeps_two_decimals() {
        assert_eq!(Money::from_minor(30000).to_string(), "300.00");
        assert_eq!(Money::from_minor(-1250).to_string(), "-12.50");
    }

    #[test]
    fn test_negligible() {
        assert!(Money::ZERO.is_negligible());
        assert!(Money::EPSILON.is_negligible());
        assert!((-Money::EPSILON).is_negligible());
        assert!(!Money::from_minor(2).is_negligible());
        assert!(!Money::from_minor(i64::MIN).is_negligible());
    }

    #[test]
    fn test_checked_arithmetic() {
        let big = Money::from_minor(i64::MAX);
        assert_eq!(big.checked_add(Money::EPSILON), None);
        assert_eq!(
            Money::from_minor(-i64::MAX).checked_sub(Money::from_minor(2)),
            None
        );
        assert_eq!(
            Money::from_minor(5).checked_sub(Money::from_minor(7)),
            Some(Money::from_minor(-2))
        );
    }

    #[test]
    fn test_json_accepts_numbers_and_strings() {
        let from_number: Money = serde_json::from_str("37.5").unwrap();
        let from_string: Money = serde_json::from_str("\"37.50\"").unwrap();
        assert_eq!(from_number, Money::from_minor(3750));
        assert_eq!(from_string, from_number);
        assert_eq!(serde_json::to_string(&from_number).unwrap(), "\"37.50\"");
    }
}
