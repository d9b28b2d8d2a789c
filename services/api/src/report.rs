use crate::infra::{load_snapshot, parse_date, parse_decimal, parse_money};
use chrono::NaiveDate;
use clap::Args;
use concession_billing::billing::{
    BillingEngine, CalculationResult, ChargeSet, ContractId, EngineError, InvalidCharge, Money,
    PeriodInput, SnapshotImporter,
};
use concession_billing::config::{AppConfig, ConfigError};
use concession_billing::error::AppError;
use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct CalculateArgs {
    /// Billing snapshot JSON (defaults to BILLING_SNAPSHOT_PATH)
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
    /// Extra charge rows as CSV (defaults to BILLING_CHARGES_CSV)
    #[arg(long)]
    pub(crate) charges_csv: Option<PathBuf>,
    /// Contract to bill
    #[arg(long)]
    pub(crate) contract: String,
    /// First day of the billing period (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) period_start: NaiveDate,
    /// Last day of the billing period (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) period_end: NaiveDate,
    /// Reported gross sales for the period
    #[arg(long, value_parser = parse_money)]
    pub(crate) sales: Money,
    /// Units sold, for per-unit charges
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub(crate) units: Decimal,
    /// Leased area in m2; overrides the area stored on per-area charges
    #[arg(long, value_parser = parse_decimal)]
    pub(crate) area: Option<Decimal>,
    /// Date used to pick the configuration (defaults to the period start)
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Print the raw JSON result instead of the itemized report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ValidateChargesArgs {
    /// Charge CSV export to check
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

pub(crate) fn run_calculation(args: CalculateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let snapshot_path = args
        .snapshot
        .or(config.billing.snapshot_path.clone())
        .ok_or(ConfigError::MissingSnapshot)?;
    let charges_csv = args.charges_csv.or(config.billing.charges_csv_path.clone());

    let snapshot = Arc::new(load_snapshot(
        Some(snapshot_path.as_path()),
        charges_csv.as_deref(),
    )?);
    let engine = BillingEngine::new(
        snapshot.clone(),
        snapshot,
        config.billing.engine_settings(),
    );

    let contract_id = ContractId(args.contract);
    let period = PeriodInput {
        period_start: args.period_start,
        period_end: args.period_end,
        reported_sales: args.sales,
        units_sold: args.units,
        leased_area_m2: args.area,
    };
    let as_of = args.as_of.unwrap_or(period.period_start);

    let result = engine.calculate(&contract_id, as_of, &period)?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&result).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        print!("{}", render_calculation(&contract_id, &period, &result));
    }
    Ok(())
}

pub(crate) fn run_charge_validation(args: ValidateChargesArgs) -> Result<(), AppError> {
    let records = SnapshotImporter::charges_from_csv_path(&args.csv)?;
    let charges = ChargeSet::load(records);
    let invalid: Vec<InvalidCharge> = charges.invalid().cloned().collect();

    print!("{}", render_validation(charges.len(), &invalid));

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(EngineError::InvalidChargeDefinition { charges: invalid }.into())
    }
}

fn render_calculation(
    contract_id: &ContractId,
    period: &PeriodInput,
    result: &CalculationResult,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Contract {} | period {} to {} | reported sales {}",
        contract_id, period.period_start, period.period_end, period.reported_sales
    );
    if result.charge_breakdown.is_empty() {
        let _ = writeln!(out, "No charges configured.");
    }
    for line in &result.charge_breakdown {
        match &line.skip_reason {
            Some(reason) => {
                let _ = writeln!(
                    out,
                    "- {} {} [{}]: skipped, {}",
                    line.charge_id,
                    line.name,
                    line.charge_type,
                    reason.summary()
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "- {} {} [{}]: {}",
                    line.charge_id, line.name, line.charge_type, line.amount
                );
            }
        }
    }
    let _ = writeln!(
        out,
        "Charges applied: {} of {}",
        result.applied_lines().count(),
        result.charge_breakdown.len()
    );
    let _ = writeln!(out, "Subtotal: {}", result.subtotal);
    if result.minimum_guarantee_applied {
        let _ = writeln!(
            out,
            "Minimum guarantee top-up: {}",
            result.guarantee_adjustment
        );
    }
    let _ = writeln!(out, "Amount due: {}", result.final_amount);
    out
}

fn render_validation(checked: usize, invalid: &[InvalidCharge]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} charges checked, {} invalid", checked, invalid.len());
    for charge in invalid {
        let status = if charge.is_active { "" } else { " (inactive)" };
        let _ = writeln!(
            out,
            "- {} {} [{}]{}",
            charge.charge_id, charge.name, charge.declared_type, status
        );
        for defect in &charge.defects {
            let _ = writeln!(out, "    {defect}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use concession_billing::billing::{
        BreakdownLine, ChargeDefect, ChargeId, SkipReason,
    };

    fn money(raw: &str) -> Money {
        Money::parse(raw).expect("valid money")
    }

    fn april() -> PeriodInput {
        PeriodInput {
            period_start: NaiveDate::from_ymd_opt(2024, 4, 1).expect("valid date"),
            period_end: NaiveDate::from_ymd_opt(2024, 4, 30).expect("valid date"),
            reported_sales: money("200000.00"),
            units_sold: Decimal::ZERO,
            leased_area_m2: None,
        }
    }

    #[test]
    fn calculation_report_lists_lines_and_top_up() {
        let result = CalculationResult {
            subtotal: money("9000.00"),
            charge_breakdown: vec![
                BreakdownLine {
                    charge_id: ChargeId("c-base".to_string()),
                    name: "Base rent".to_string(),
                    charge_type: "Fixed".to_string(),
                    amount: money("9000.00"),
                    applied: true,
                    skip_reason: None,
                },
                BreakdownLine {
                    charge_id: ChargeId("c-old".to_string()),
                    name: "Legacy levy".to_string(),
                    charge_type: "Fixed".to_string(),
                    amount: Money::ZERO,
                    applied: false,
                    skip_reason: Some(SkipReason::Inactive),
                },
            ],
            minimum_guarantee_applied: true,
            guarantee_adjustment: money("1000.00"),
            final_amount: money("10000.00"),
        };

        let report = render_calculation(&ContractId("CT-1".to_string()), &april(), &result);

        assert!(report.contains("- c-base Base rent [Fixed]: 9000.00"));
        assert!(report.contains("c-old Legacy levy [Fixed]: skipped, charge is inactive"));
        assert!(report.contains("Charges applied: 1 of 2"));
        assert!(report.contains("Minimum guarantee top-up: 1000.00"));
        assert!(report.ends_with("Amount due: 10000.00\n"));
    }

    #[test]
    fn validation_report_lists_every_defect() {
        let invalid = vec![InvalidCharge {
            charge_id: ChargeId("c-turnover".to_string()),
            name: "Turnover rent".to_string(),
            declared_type: "PercentageOfSales".to_string(),
            is_active: false,
            defects: vec![ChargeDefect::MissingParameter {
                parameter: "percentage",
            }],
        }];

        let report = render_validation(3, &invalid);

        assert!(report.starts_with("3 charges checked, 1 invalid"));
        assert!(report.contains("c-turnover Turnover rent [PercentageOfSales] (inactive)"));
        assert!(report.contains("required parameter 'percentage' is missing"));
    }
}
