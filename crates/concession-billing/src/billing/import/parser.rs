use std::io::Read;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use super::super::charge::ChargeRecord;
use super::super::domain::{ChargeId, ConfigurationId};
use super::super::money::Money;
use super::RowError;

pub(crate) fn parse_charge_rows<R: Read>(reader: R) -> Result<Vec<ChargeRecord>, RowError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers().map_err(RowError::csv)?.clone();
    let mut records = Vec::new();

    for result in csv_reader.records() {
        let raw = result.map_err(RowError::csv)?;
        let line = raw.position().map(|position| position.line()).unwrap_or(0);
        let row: ChargeRow = raw.deserialize(Some(&headers)).map_err(RowError::csv)?;
        records.push(row.into_record().map_err(|(column, message)| RowError::Value {
            line,
            column,
            message,
        })?);
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct ChargeRow {
    id: String,
    #[serde(alias = "configurationId")]
    configuration_id: String,
    name: String,
    #[serde(alias = "isActive", default, deserialize_with = "empty_string_as_none")]
    is_active: Option<String>,
    #[serde(rename = "type", alias = "charge_type")]
    charge_type: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    amount: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    percentage: Option<String>,
    #[serde(alias = "unitRate", default, deserialize_with = "empty_string_as_none")]
    unit_rate: Option<String>,
    #[serde(alias = "unitLabel", default, deserialize_with = "empty_string_as_none")]
    unit_label: Option<String>,
    #[serde(alias = "areaRate", default, deserialize_with = "empty_string_as_none")]
    area_rate: Option<String>,
    #[serde(alias = "areaM2", default, deserialize_with = "empty_string_as_none")]
    area_m2: Option<String>,
    #[serde(
        alias = "appliesFromMonth",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    applies_from_month: Option<String>,
    #[serde(
        alias = "appliesFromDay",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    applies_from_day: Option<String>,
}

type ColumnError = (&'static str, String);

impl ChargeRow {
    fn into_record(self) -> Result<ChargeRecord, ColumnError> {
        Ok(ChargeRecord {
            id: ChargeId(self.id),
            configuration_id: ConfigurationId(self.configuration_id),
            name: self.name,
            is_active: parse_flag(self.is_active.as_deref()).map_err(|err| ("is_active", err))?,
            charge_type: self.charge_type,
            amount: parse_money("amount", self.amount)?,
            percentage: parse_decimal("percentage", self.percentage)?,
            unit_rate: parse_money("unit_rate", self.unit_rate)?,
            unit_label: self.unit_label,
            area_rate: parse_money("area_rate", self.area_rate)?,
            area_m2: parse_decimal("area_m2", self.area_m2)?,
            applies_from_month: parse_int("applies_from_month", self.applies_from_month)?,
            applies_from_day: parse_int("applies_from_day", self.applies_from_day)?,
        })
    }
}

/// Missing flag cells default to active.
fn parse_flag(value: Option<&str>) -> Result<bool, String> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None => Ok(true),
        Some("true" | "t" | "1" | "yes" | "y") => Ok(true),
        Some("false" | "f" | "0" | "no" | "n") => Ok(false),
        Some(other) => Err(format!("'{other}' is not a boolean")),
    }
}

fn parse_money(column: &'static str, value: Option<String>) -> Result<Option<Money>, ColumnError> {
    value
        .map(|raw| Money::parse(&raw).map_err(|err| (column, err.to_string())))
        .transpose()
}

fn parse_decimal(
    column: &'static str,
    value: Option<String>,
) -> Result<Option<Decimal>, ColumnError> {
    value
        .map(|raw| {
            Decimal::from_str(&raw).map_err(|_| (column, format!("'{raw}' is not a decimal")))
        })
        .transpose()
}

fn parse_int(column: &'static str, value: Option<String>) -> Result<Option<u32>, ColumnError> {
    value
        .map(|raw| {
            raw.parse::<u32>()
                .map_err(|_| (column, format!("'{raw}' is not a whole number")))
        })
        .transpose()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
