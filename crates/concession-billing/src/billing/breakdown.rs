use serde::{Deserialize, Serialize};

use super::domain::ChargeId;
use super::engine::EngineError;
use super::evaluation::{ChargeEvaluation, EvaluationOutcome, SkipReason};
use super::guarantee::GuaranteeOutcome;
use super::money::Money;

/// One itemized line, present for every stored charge including skipped ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownLine {
    pub charge_id: ChargeId,
    pub name: String,
    #[serde(rename = "type")]
    pub charge_type: String,
    pub amount: Money,
    pub applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
}

/// Final, caller-owned result of one calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub subtotal: Money,
    pub charge_breakdown: Vec<BreakdownLine>,
    pub minimum_guarantee_applied: bool,
    pub guarantee_adjustment: Money,
    pub final_amount: Money,
}

impl CalculationResult {
    pub fn applied_lines(&self) -> impl Iterator<Item = &BreakdownLine> {
        self.charge_breakdown.iter().filter(|line| line.applied)
    }
}

/// Sum of applied amounts; skipped and invalid charges contribute nothing.
pub fn subtotal(evaluations: &[ChargeEvaluation]) -> Result<Money, EngineError> {
    evaluations
        .iter()
        .filter_map(|evaluation| evaluation.outcome.applied_amount())
        .try_fold(Money::ZERO, |total, amount| total.checked_add(amount))
        .ok_or(EngineError::AmountOverflow)
}

/// Builds the result, failing closed if any charge is invalid.
pub fn assemble(
    evaluations: Vec<ChargeEvaluation>,
    enforcement: GuaranteeOutcome,
) -> Result<CalculationResult, EngineError> {
    let subtotal = subtotal(&evaluations)?;
    debug_assert_eq!(subtotal, enforcement.subtotal);

    let mut charge_breakdown = Vec::with_capacity(evaluations.len());
    let mut invalid = Vec::new();

    for evaluation in evaluations {
        let (amount, applied, skip_reason) = match evaluation.outcome {
            EvaluationOutcome::Applied { amount } => (amount, true, None),
            EvaluationOutcome::Skipped { reason } => (Money::ZERO, false, Some(reason)),
            EvaluationOutcome::Invalid { .. } => {
                invalid.extend(evaluation.as_invalid());
                continue;
            }
        };
        charge_breakdown.push(BreakdownLine {
            charge_id: evaluation.charge_id,
            name: evaluation.name,
            charge_type: evaluation.charge_type,
            amount,
            applied,
            skip_reason,
        });
    }

    if !invalid.is_empty() {
        return Err(EngineError::InvalidChargeDefinition { charges: invalid });
    }

    Ok(CalculationResult {
        subtotal,
        charge_breakdown,
        minimum_guarantee_applied: enforcement.applied,
        guarantee_adjustment: enforcement.adjustment,
        final_amount: enforcement.final_amount,
    })
}
