use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{ChargeId, ConfigurationId};
use super::money::Money;

/// Declared formula family of a charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargeType {
    Fixed,
    PercentageOfSales,
    PerUnit,
    PerArea,
}

impl ChargeType {
    pub fn label(self) -> &'static str {
        match self {
            ChargeType::Fixed => "Fixed",
            ChargeType::PercentageOfSales => "PercentageOfSales",
            ChargeType::PerUnit => "PerUnit",
            ChargeType::PerArea => "PerArea",
        }
    }
}

impl fmt::Display for ChargeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChargeType {
    type Err = ChargeDefect;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "fixed" | "fixedamount" | "flat" => Ok(Self::Fixed),
            "percentageofsales" | "percentage" | "percent" | "salespercentage" => {
                Ok(Self::PercentageOfSales)
            }
            "perunit" | "unit" | "unitrate" => Ok(Self::PerUnit),
            "perarea" | "area" | "perm2" | "persquaremeter" => Ok(Self::PerArea),
            _ => Err(ChargeDefect::UnknownType {
                declared: value.to_string(),
            }),
        }
    }
}

/// Charge row as stored upstream: every parameter column is optional and the
/// type is free text. Converted into a [`ChargeDefinition`] once, at load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRecord {
    pub id: ChargeId,
    pub configuration_id: ConfigurationId,
    pub name: String,
    pub is_active: bool,
    #[serde(rename = "type")]
    pub charge_type: String,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub percentage: Option<Decimal>,
    #[serde(default)]
    pub unit_rate: Option<Money>,
    #[serde(default)]
    pub unit_label: Option<String>,
    #[serde(default)]
    pub area_rate: Option<Money>,
    #[serde(default)]
    pub area_m2: Option<Decimal>,
    #[serde(default)]
    pub applies_from_month: Option<u32>,
    #[serde(default)]
    pub applies_from_day: Option<u32>,
}

/// Type-specific parameters of a validated charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeKind {
    Fixed {
        amount: Money,
    },
    PercentageOfSales {
        percentage: Decimal,
    },
    PerUnit {
        unit_rate: Money,
        unit_label: String,
    },
    PerArea {
        area_rate: Money,
        area_m2: Option<Decimal>,
    },
}

impl ChargeKind {
    pub fn charge_type(&self) -> ChargeType {
        match self {
            ChargeKind::Fixed { .. } => ChargeType::Fixed,
            ChargeKind::PercentageOfSales { .. } => ChargeType::PercentageOfSales,
            ChargeKind::PerUnit { .. } => ChargeType::PerUnit,
            ChargeKind::PerArea { .. } => ChargeType::PerArea,
        }
    }
}

/// Recurring yearly month/day threshold after which a charge applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnnualAnchor {
    pub month: u32,
    pub day: u32,
}

impl AnnualAnchor {
    /// A missing month means January and a missing day means the 1st.
    pub fn from_parts(month: Option<u32>, day: Option<u32>) -> Result<Option<Self>, ChargeDefect> {
        if month.is_none() && day.is_none() {
            return Ok(None);
        }

        let month = month.unwrap_or(1);
        let day = day.unwrap_or(1);
        let max_day = match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 => 29,
            _ => return Err(ChargeDefect::InvalidAnchor { month, day }),
        };
        if day == 0 || day > max_day {
            return Err(ChargeDefect::InvalidAnchor { month, day });
        }

        Ok(Some(Self { month, day }))
    }
}

impl fmt::Display for AnnualAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// Charge whose parameters match its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeDefinition {
    pub id: ChargeId,
    pub configuration_id: ConfigurationId,
    pub name: String,
    pub is_active: bool,
    pub kind: ChargeKind,
    pub anchor: Option<AnnualAnchor>,
}

impl ChargeDefinition {
    pub fn charge_type(&self) -> ChargeType {
        self.kind.charge_type()
    }
}

impl TryFrom<ChargeRecord> for ChargeDefinition {
    type Error = InvalidCharge;

    fn try_from(record: ChargeRecord) -> Result<Self, Self::Error> {
        let mut defects = Vec::new();

        let anchor = AnnualAnchor::from_parts(record.applies_from_month, record.applies_from_day)
            .unwrap_or_else(|defect| {
                defects.push(defect);
                None
            });

        let kind = match record.charge_type.parse::<ChargeType>() {
            Ok(charge_type) => {
                reject_foreign_parameters(&record, charge_type, &mut defects);
                build_kind(&record, charge_type, &mut defects)
            }
            Err(defect) => {
                defects.push(defect);
                None
            }
        };

        match kind {
            Some(kind) if defects.is_empty() => Ok(Self {
                id: record.id,
                configuration_id: record.configuration_id,
                name: record.name,
                is_active: record.is_active,
                kind,
                anchor,
            }),
            _ => Err(InvalidCharge {
                charge_id: record.id,
                name: record.name,
                declared_type: record.charge_type,
                is_active: record.is_active,
                defects,
            }),
        }
    }
}

fn build_kind(
    record: &ChargeRecord,
    charge_type: ChargeType,
    defects: &mut Vec<ChargeDefect>,
) -> Option<ChargeKind> {
    match charge_type {
        ChargeType::Fixed => {
            let amount = required_money(record.amount, "amount", defects)?;
            Some(ChargeKind::Fixed { amount })
        }
        ChargeType::PercentageOfSales => {
            let Some(percentage) = record.percentage else {
                defects.push(ChargeDefect::MissingParameter {
                    parameter: "percentage",
                });
                return None;
            };
            if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
                defects.push(ChargeDefect::PercentageOutOfRange { percentage });
                return None;
            }
            Some(ChargeKind::PercentageOfSales { percentage })
        }
        ChargeType::PerUnit => {
            let unit_rate = required_money(record.unit_rate, "unitRate", defects);
            let unit_label = record
                .unit_label
                .as_deref()
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(str::to_string);
            if unit_label.is_none() {
                defects.push(ChargeDefect::MissingParameter {
                    parameter: "unitLabel",
                });
            }
            Some(ChargeKind::PerUnit {
                unit_rate: unit_rate?,
                unit_label: unit_label?,
            })
        }
        ChargeType::PerArea => {
            let area_rate = required_money(record.area_rate, "areaRate", defects)?;
            if let Some(area) = record.area_m2 {
                if area < Decimal::ZERO {
                    defects.push(ChargeDefect::NegativeArea { area_m2: area });
                    return None;
                }
            }
            Some(ChargeKind::PerArea {
                area_rate,
                area_m2: record.area_m2,
            })
        }
    }
}

fn required_money(
    value: Option<Money>,
    parameter: &'static str,
    defects: &mut Vec<ChargeDefect>,
) -> Option<Money> {
    match value {
        None => {
            defects.push(ChargeDefect::MissingParameter { parameter });
            None
        }
        Some(amount) if amount.is_negative() => {
            defects.push(ChargeDefect::NegativeRate { parameter, amount });
            None
        }
        Some(amount) => Some(amount),
    }
}

fn reject_foreign_parameters(
    record: &ChargeRecord,
    charge_type: ChargeType,
    defects: &mut Vec<ChargeDefect>,
) {
    let populated = [
        (ChargeType::Fixed, "amount", record.amount.is_some()),
        (
            ChargeType::PercentageOfSales,
            "percentage",
            record.percentage.is_some(),
        ),
        (ChargeType::PerUnit, "unitRate", record.unit_rate.is_some()),
        (ChargeType::PerUnit, "unitLabel", record.unit_label.is_some()),
        (ChargeType::PerArea, "areaRate", record.area_rate.is_some()),
        (ChargeType::PerArea, "areaM2", record.area_m2.is_some()),
    ];

    defects.extend(
        populated
            .into_iter()
            .filter(|(owner, _, present)| *present && *owner != charge_type)
            .map(|(_, parameter, _)| ChargeDefect::UnexpectedParameter { parameter }),
    );
}

/// Reason a charge cannot be billed as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "defect", rename_all = "snake_case")]
pub enum ChargeDefect {
    #[error("unknown charge type '{declared}'")]
    UnknownType { declared: String },
    #[error("required parameter '{parameter}' is missing")]
    MissingParameter { parameter: &'static str },
    #[error("parameter '{parameter}' does not belong to this charge type")]
    UnexpectedParameter { parameter: &'static str },
    #[error("percentage {percentage} is outside 0-100")]
    PercentageOutOfRange { percentage: Decimal },
    #[error("parameter '{parameter}' has negative value {amount}")]
    NegativeRate {
        parameter: &'static str,
        amount: Money,
    },
    #[error("configured area {area_m2} m2 is negative")]
    NegativeArea { area_m2: Decimal },
    #[error("annual anchor month {month} / day {day} is not a calendar date")]
    InvalidAnchor { month: u32, day: u32 },
    #[error("no leased area was reported and the charge has no configured area")]
    MissingArea,
    #[error("charge amount exceeds the representable range")]
    AmountOverflow,
}

/// A stored charge that failed validation, with every defect found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidCharge {
    pub charge_id: ChargeId,
    pub name: String,
    pub declared_type: String,
    #[serde(skip)]
    pub is_active: bool,
    pub defects: Vec<ChargeDefect>,
}

impl fmt::Display for InvalidCharge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let details: Vec<String> = self.defects.iter().map(ToString::to_string).collect();
        write!(f, "{} ({}): {}", self.charge_id, self.name, details.join("; "))
    }
}

/// Outcome of loading one stored charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadedCharge {
    Valid(ChargeDefinition),
    Invalid(InvalidCharge),
}

impl LoadedCharge {
    pub fn charge_id(&self) -> &ChargeId {
        match self {
            LoadedCharge::Valid(definition) => &definition.id,
            LoadedCharge::Invalid(invalid) => &invalid.charge_id,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            LoadedCharge::Valid(definition) => definition.is_active,
            LoadedCharge::Invalid(invalid) => invalid.is_active,
        }
    }
}

/// Charges of one configuration in stored order, validated once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChargeSet {
    entries: Vec<LoadedCharge>,
}

impl ChargeSet {
    pub fn load<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ChargeRecord>,
    {
        let entries = records
            .into_iter()
            .map(|record| match ChargeDefinition::try_from(record) {
                Ok(definition) => LoadedCharge::Valid(definition),
                Err(invalid) => LoadedCharge::Invalid(invalid),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[LoadedCharge] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invalid charges regardless of their active flag, for data-quality reports.
    pub fn invalid(&self) -> impl Iterator<Item = &InvalidCharge> {
        self.entries.iter().filter_map(|entry| match entry {
            LoadedCharge::Invalid(invalid) => Some(invalid),
            LoadedCharge::Valid(_) => None,
        })
    }
}
