use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::Money;

/// Identifier wrapper for concession contracts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContractId(pub String);

/// Identifier wrapper for payment configurations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfigurationId(pub String);

/// Identifier wrapper for charge definitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChargeId(pub String);

macro_rules! display_id {
    ($($name:ident),*) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )*
    };
}

display_id!(ContractId, ConfigurationId, ChargeId);

/// Billing rule set for one contract over a date range.
///
/// Amendments never edit a configuration in place; they arrive as a new
/// configuration with a later `effective_from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfiguration {
    pub id: ConfigurationId,
    pub contract_id: ContractId,
    pub name: String,
    pub is_active: bool,
    pub has_minimum_guarantee: bool,
    #[serde(default)]
    pub minimum_guarantee_amount: Option<Money>,
    pub effective_from: NaiveDate,
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
}

impl PaymentConfiguration {
    /// Inclusive on both ends; an absent `effective_to` is open-ended.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.effective_from <= date && self.effective_to.map_or(true, |end| date <= end)
    }

    pub fn minimum_guarantee(&self) -> Result<MinimumGuarantee, ConfigurationDefect> {
        if let Some(end) = self.effective_to {
            if end < self.effective_from {
                return Err(ConfigurationDefect::InvertedRange {
                    effective_from: self.effective_from,
                    effective_to: end,
                });
            }
        }

        match (self.has_minimum_guarantee, self.minimum_guarantee_amount) {
            (false, None) => Ok(MinimumGuarantee::None),
            (false, Some(_)) => Err(ConfigurationDefect::UnexpectedGuaranteeAmount),
            (true, None) => Err(ConfigurationDefect::MissingGuaranteeAmount),
            (true, Some(amount)) if amount.is_negative() => {
                Err(ConfigurationDefect::NegativeGuaranteeAmount { amount })
            }
            (true, Some(amount)) => Ok(MinimumGuarantee::Floor(amount)),
        }
    }
}

/// Contractual floor for the period total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinimumGuarantee {
    None,
    Floor(Money),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "defect", rename_all = "snake_case")]
pub enum ConfigurationDefect {
    #[error("minimum guarantee is enabled but no amount is configured")]
    MissingGuaranteeAmount,
    #[error("minimum guarantee amount is set while the guarantee is disabled")]
    UnexpectedGuaranteeAmount,
    #[error("minimum guarantee amount {amount} is negative")]
    NegativeGuaranteeAmount { amount: Money },
    #[error("effective range ends ({effective_to}) before it starts ({effective_from})")]
    InvertedRange {
        effective_from: NaiveDate,
        effective_to: NaiveDate,
    },
}

/// Measurements reported for one billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodInput {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub reported_sales: Money,
    pub units_sold: Decimal,
    #[serde(default)]
    pub leased_area_m2: Option<Decimal>,
}

impl PeriodInput {
    pub fn validate(&self) -> Result<(), PeriodError> {
        if self.period_end < self.period_start {
            return Err(PeriodError::InvertedPeriod {
                period_start: self.period_start,
                period_end: self.period_end,
            });
        }
        if self.reported_sales.is_negative() {
            return Err(PeriodError::NegativeSales(self.reported_sales));
        }
        if self.units_sold < Decimal::ZERO {
            return Err(PeriodError::NegativeUnits(self.units_sold));
        }
        if let Some(area) = self.leased_area_m2 {
            if area < Decimal::ZERO {
                return Err(PeriodError::NegativeArea(area));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeriodError {
    #[error("period ends ({period_end}) before it starts ({period_start})")]
    InvertedPeriod {
        period_start: NaiveDate,
        period_end: NaiveDate,
    },
    #[error("reported sales {0} are negative")]
    NegativeSales(Money),
    #[error("units sold {0} are negative")]
    NegativeUnits(Decimal),
    #[error("leased area {0} m2 is negative")]
    NegativeArea(Decimal),
}
