use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;

/// price amount with 2 decimal places precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(2))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str(s)?.round_dp(2)))
    }

    /// create from integer amount
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// scale by a fraction
    pub fn scale(&self, fraction: Fraction) -> Self {
        Money((self.0 * fraction.as_decimal()).round_dp(2))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money((self.0 + other.0).round_dp(2))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = (self.0 + other.0).round_dp(2);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money((self.0 - other.0).round_dp(2))
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money((self.0 * other).round_dp(2))
    }
}

/// numerator/denominator pair as stored on a billing ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: u32,
    pub denominator: u32,
}

impl Fraction {
    pub const WHOLE: Fraction = Fraction { numerator: 1, denominator: 1 };

    pub fn new(numerator: u32, denominator: u32) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        Some(Self { numerator, denominator })
    }

    /// value as decimal; a zero denominator counts as zero
    pub fn as_decimal(&self) -> Decimal {
        if self.denominator == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.numerator) / Decimal::from(self.denominator)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_precision() {
        let m = Money::from_str_exact("100.126").unwrap();
        assert_eq!(m.to_string(), "100.13");
    }

    #[test]
    fn test_scale_by_fraction() {
        let price = Money::from_major(1_000);
        let third = Fraction::new(1, 3).unwrap();

        assert_eq!(price.scale(third), Money::from_decimal(dec!(333.33)));
        assert_eq!(price.scale(Fraction::WHOLE), price);
    }

    #[test]
    fn test_fraction_rejects_zero_denominator() {
        assert!(Fraction::new(1, 0).is_none());
        assert_eq!(Fraction::new(3, 4).unwrap().as_decimal(), dec!(0.75));
    }

    #[test]
    fn test_money_arithmetic() {
        let mut total = Money::from_major(10);
        total += Money::from_str_exact("0.5").unwrap();
        assert_eq!(total - Money::from_major(10), Money::from_decimal(dec!(0.5)));
        assert_eq!(Money::from_major(3) * dec!(1.5), Money::from_decimal(dec!(4.5)));
        assert!((total - total).is_zero());
    }
}
