use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::billing::charge::ChargeRecord;
use crate::billing::domain::{
    ChargeId, ConfigurationId, ContractId, PaymentConfiguration, PeriodInput,
};
use crate::billing::engine::BillingEngine;
use crate::billing::evaluation::EngineSettings;
use crate::billing::money::Money;
use crate::billing::repository::{ChargeStore, ConfigStore, StoreError};
use crate::billing::snapshot::BillingSnapshot;

pub(super) const CONTRACT: &str = "CT-2024-017";
pub(super) const CONFIGURATION: &str = "cfg-market-hall";

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn money(raw: &str) -> Money {
    Money::parse(raw).expect("valid money")
}

pub(super) fn contract() -> ContractId {
    ContractId(CONTRACT.to_string())
}

pub(super) fn configuration(guarantee: Option<&str>) -> PaymentConfiguration {
    PaymentConfiguration {
        id: ConfigurationId(CONFIGURATION.to_string()),
        contract_id: contract(),
        name: "Market hall kiosk 2024".to_string(),
        is_active: true,
        has_minimum_guarantee: guarantee.is_some(),
        minimum_guarantee_amount: guarantee.map(money),
        effective_from: date(2024, 1, 1),
        effective_to: None,
    }
}

pub(super) fn period(sales: &str, units: Decimal, area: Option<Decimal>) -> PeriodInput {
    PeriodInput {
        period_start: date(2024, 4, 1),
        period_end: date(2024, 4, 30),
        reported_sales: money(sales),
        units_sold: units,
        leased_area_m2: area,
    }
}

fn blank_charge(id: &str, charge_type: &str) -> ChargeRecord {
    ChargeRecord {
        id: ChargeId(id.to_string()),
        configuration_id: ConfigurationId(CONFIGURATION.to_string()),
        name: format!("{charge_type} charge {id}"),
        is_active: true,
        charge_type: charge_type.to_string(),
        amount: None,
        percentage: None,
        unit_rate: None,
        unit_label: None,
        area_rate: None,
        area_m2: None,
        applies_from_month: None,
        applies_from_day: None,
    }
}

pub(super) fn fixed(id: &str, amount: &str) -> ChargeRecord {
    ChargeRecord {
        amount: Some(money(amount)),
        ..blank_charge(id, "Fixed")
    }
}

pub(super) fn percentage(id: &str, percentage: Decimal) -> ChargeRecord {
    ChargeRecord {
        percentage: Some(percentage),
        ..blank_charge(id, "PercentageOfSales")
    }
}

pub(super) fn per_unit(id: &str, rate: &str, label: &str) -> ChargeRecord {
    ChargeRecord {
        unit_rate: Some(money(rate)),
        unit_label: Some(label.to_string()),
        ..blank_charge(id, "PerUnit")
    }
}

pub(super) fn per_area(id: &str, rate: &str, area: Option<Decimal>) -> ChargeRecord {
    ChargeRecord {
        area_rate: Some(money(rate)),
        area_m2: area,
        ..blank_charge(id, "PerArea")
    }
}

pub(super) fn untyped(id: &str, charge_type: &str) -> ChargeRecord {
    blank_charge(id, charge_type)
}

pub(super) fn snapshot(
    configurations: Vec<PaymentConfiguration>,
    charges: Vec<ChargeRecord>,
) -> Arc<BillingSnapshot> {
    Arc::new(BillingSnapshot::new(configurations, charges))
}

pub(super) fn build_engine(
    configurations: Vec<PaymentConfiguration>,
    charges: Vec<ChargeRecord>,
) -> BillingEngine<BillingSnapshot, BillingSnapshot> {
    let store = snapshot(configurations, charges);
    BillingEngine::new(store.clone(), store, EngineSettings::default())
}

/// Store double that is always down.
pub(super) struct UnavailableStore;

impl ConfigStore for UnavailableStore {
    fn find_active(
        &self,
        _contract_id: &ContractId,
        _as_of: NaiveDate,
    ) -> Result<Vec<PaymentConfiguration>, StoreError> {
        Err(StoreError::Unavailable("replica lagging".to_string()))
    }
}

impl ChargeStore for UnavailableStore {
    fn list_for(
        &self,
        _configuration_id: &ConfigurationId,
    ) -> Result<Vec<ChargeRecord>, StoreError> {
        Err(StoreError::Unavailable("replica lagging".to_string()))
    }
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
