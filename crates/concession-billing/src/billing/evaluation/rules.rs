use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::super::charge::{AnnualAnchor, ChargeDefect, ChargeKind};
use super::super::domain::PeriodInput;
use super::super::money::{Money, RoundingMode};

/// Inclusive yearly threshold on the period start's own year.
pub(crate) fn anchor_reached(anchor: &AnnualAnchor, period_start: NaiveDate) -> bool {
    (period_start.month(), period_start.day()) >= (anchor.month, anchor.day)
}

/// Reported leased area wins over the area configured on the charge.
pub(crate) fn resolve_area(reported: Option<Decimal>, configured: Option<Decimal>) -> Option<Decimal> {
    reported.or(configured)
}

/// Amount of one charge line, rounded once to a whole minor unit with `rounding`.
///
/// Products that already land on a whole minor unit (e.g. whole units times a rate)
/// are exact. Only fractional quantities such as 2.5 units hit the rounding rule, and
/// the subtotal is then the exact sum of these line amounts.
pub(crate) fn charge_amount(
    kind: &ChargeKind,
    period: &PeriodInput,
    rounding: RoundingMode,
) -> Result<Money, ChargeDefect> {
    match kind {
        ChargeKind::Fixed { amount } => Ok(*amount),
        ChargeKind::PercentageOfSales { percentage } => {
            let factor = percentage
                .checked_div(Decimal::ONE_HUNDRED)
                .ok_or(ChargeDefect::AmountOverflow)?;
            period
                .reported_sales
                .scaled(factor, rounding)
                .ok_or(ChargeDefect::AmountOverflow)
        }
        ChargeKind::PerUnit { unit_rate, .. } => unit_rate
            .scaled(period.units_sold, rounding)
            .ok_or(ChargeDefect::AmountOverflow),
        ChargeKind::PerArea { area_rate, area_m2 } => {
            let area =
                resolve_area(period.leased_area_m2, *area_m2).ok_or(ChargeDefect::MissingArea)?;
            area_rate
                .scaled(area, rounding)
                .ok_or(ChargeDefect::AmountOverflow)
        }
    }
}
