use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::ValidationError;

/// Number of fractional digits every amount carries.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Signed money amount backed by an exact decimal.
///
/// Use this type for **all** monetary values in the engine (totals, splits,
/// settlements, balances). No binary floating point is involved anywhere: the
/// value is a [`Decimal`] normalized to two fractional digits, and it is
/// stored as integer minor units.
///
/// The value is signed; in balances:
/// - positive = the group owes this user
/// - negative = this user owes the group
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount: Money = "33.3".parse().unwrap();
/// assert_eq!(amount.to_string(), "33.30");
/// assert_eq!(amount.minor_units().unwrap(), 3330);
/// assert_eq!(Money::from_minor(3330), amount);
/// ```
///
/// Parsing rejects anything that is not a plain decimal with at most two
/// fractional digits:
///
/// ```rust
/// use engine::Money;
///
/// assert!("12.345".parse::<Money>().is_err());
/// assert!("1e3".parse::<Money>().is_err());
/// assert!("".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Creates an amount from integer minor units (cents).
    #[must_use]
    pub fn from_minor(minor: i64) -> Self {
        Self(Decimal::new(minor, MINOR_UNIT_SCALE))
    }

    /// Creates an amount from a decimal, rejecting sub-cent precision.
    pub fn from_decimal(value: Decimal) -> Result<Self, ValidationError> {
        let value = value.normalize();
        if value.scale() > MINOR_UNIT_SCALE {
            return Err(ValidationError::MalformedAmount(format!(
                "too many decimals: {value}"
            )));
        }
        let mut scaled = value;
        scaled.rescale(MINOR_UNIT_SCALE);
        Ok(Self(scaled))
    }

    /// Returns the exact decimal value.
    #[must_use]
    pub fn amount(self) -> Decimal {
        self.0
    }

    /// Returns the value as integer minor units, as it is stored.
    pub fn minor_units(self) -> Result<i64, ValidationError> {
        let mut scaled = self.0;
        scaled.rescale(MINOR_UNIT_SCALE);
        i64::try_from(scaled.mantissa())
            .map_err(|_| ValidationError::MalformedAmount("amount too large".to_string()))
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if the amount is strictly positive.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns `true` if the amount is strictly negative.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Avoid printing "-0.00".
        let mut value = if self.0.is_zero() {
            Decimal::ZERO
        } else {
            self.0
        };
        value.rescale(MINOR_UNIT_SCALE);
        write!(f, "{value}")
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, value| acc + value)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    /// Parses a decimal string.
    ///
    /// Accepts an optional leading `+`/`-`, ASCII digits and an optional `.`
    /// followed by at most two digits. Exponents, separators other than `.`
    /// and surrounding text are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ValidationError::MalformedAmount(format!("invalid amount: {s:?}"));

        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('-')
            .or_else(|| trimmed.strip_prefix('+'))
            .unwrap_or(trimmed);

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (digits, None),
        };

        if int_part.is_empty() || !int_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        if let Some(frac) = frac_part {
            if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(malformed());
            }
            if frac.len() > MINOR_UNIT_SCALE as usize {
                return Err(ValidationError::MalformedAmount(format!(
                    "too many decimals: {s:?}"
                )));
            }
        }

        let value = Decimal::from_str(trimmed.trim_start_matches('+')).map_err(|_| malformed())?;
        let money = Self::from_decimal(value)?;
        // Everything that parses must also be storable.
        money.minor_units()?;
        Ok(money)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
