use chrono::NaiveDate;
use concession_billing::billing::{BillingSnapshot, ImportError, Money, SnapshotImporter};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Reads the JSON snapshot (when given) and appends charge rows from a CSV export.
pub(crate) fn load_snapshot(
    snapshot_path: Option<&Path>,
    charges_csv: Option<&Path>,
) -> Result<BillingSnapshot, ImportError> {
    let snapshot = match snapshot_path {
        Some(path) => SnapshotImporter::from_path(path)?,
        None => BillingSnapshot::default(),
    };

    let snapshot = match charges_csv {
        Some(path) => snapshot.with_charges(SnapshotImporter::charges_from_csv_path(path)?),
        None => snapshot,
    };

    info!(
        configurations = snapshot.configurations.len(),
        charges = snapshot.charges.len(),
        "billing snapshot loaded"
    );
    Ok(snapshot)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_money(raw: &str) -> Result<Money, String> {
    Money::parse(raw).map_err(|err| err.to_string())
}

pub(crate) fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw.trim()).map_err(|_| format!("'{raw}' is not a decimal number"))
}
