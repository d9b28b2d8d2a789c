use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

/// Number of fractional digits carried by one minor unit (cents).
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Monetary amount held as whole minor units.
///
/// Values enter the engine as decimal strings and are parsed exactly once;
/// anything finer than a minor unit is rejected instead of rounded.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub fn from_major(major: i64) -> Option<Self> {
        major.checked_mul(100).map(Self)
    }

    pub fn parse(raw: &str) -> Result<Self, MoneyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MoneyError::Empty);
        }

        let value =
            Decimal::from_str(trimmed).map_err(|_| MoneyError::Malformed(trimmed.to_string()))?;
        if value.normalize().scale() > MINOR_UNIT_SCALE {
            return Err(MoneyError::SubMinorPrecision(trimmed.to_string()));
        }

        value
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|minor| minor.to_i64())
            .map(Self)
            .ok_or_else(|| MoneyError::OutOfRange(trimmed.to_string()))
    }

    pub fn minor_units(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Multiplies by `factor` in minor units, rounding once to a whole minor unit.
    pub fn scaled(self, factor: Decimal, rounding: RoundingMode) -> Option<Money> {
        Decimal::from(self.0)
            .checked_mul(factor)?
            .round_dp_with_strategy(0, rounding.strategy())
            .to_i64()
            .map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Money::parse(&value)
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("money value is empty")]
    Empty,
    #[error("'{0}' is not a decimal amount")]
    Malformed(String),
    #[error("'{0}' is finer than one minor unit")]
    SubMinorPrecision(String),
    #[error("'{0}' is outside the representable range")]
    OutOfRange(String),
}

/// Midpoint rule used when a scaled amount falls between two minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    #[default]
    HalfUp,
    HalfEven,
}

impl RoundingMode {
    pub fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RoundingMode::HalfUp => "half_up",
            RoundingMode::HalfEven => "half_even",
        }
    }
}

impl FromStr for RoundingMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "half_up" | "halfup" | "commercial" => Ok(Self::HalfUp),
            "half_even" | "halfeven" | "bankers" | "banker" => Ok(Self::HalfEven),
            other => Err(format!("unknown rounding mode '{other}'")),
        }
    }
}
