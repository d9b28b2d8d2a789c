mod config;
mod rules;

pub use config::EngineSettings;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::charge::{
    AnnualAnchor, ChargeDefect, ChargeSet, ChargeType, InvalidCharge, LoadedCharge,
};
use super::domain::{ChargeId, PeriodInput};
use super::money::Money;

/// Stateless evaluator applying each charge formula to the period measurements.
#[derive(Debug, Clone, Default)]
pub struct ChargeEvaluator {
    settings: EngineSettings,
}

impl ChargeEvaluator {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Evaluates every charge in stored order; nothing is dropped.
    pub fn evaluate(&self, charges: &ChargeSet, period: &PeriodInput) -> Vec<ChargeEvaluation> {
        charges
            .entries()
            .iter()
            .map(|entry| {
                let evaluation = self.evaluate_one(entry, period);
                debug!(
                    charge_id = %evaluation.charge_id,
                    outcome = evaluation.outcome.label(),
                    "charge evaluated"
                );
                evaluation
            })
            .collect()
    }

    fn evaluate_one(&self, entry: &LoadedCharge, period: &PeriodInput) -> ChargeEvaluation {
        if !entry.is_active() {
            return ChargeEvaluation::from_entry(
                entry,
                EvaluationOutcome::Skipped {
                    reason: SkipReason::Inactive,
                },
            );
        }

        let definition = match entry {
            LoadedCharge::Valid(definition) => definition,
            LoadedCharge::Invalid(invalid) => {
                return ChargeEvaluation::from_entry(
                    entry,
                    EvaluationOutcome::Invalid {
                        defects: invalid.defects.clone(),
                    },
                )
            }
        };

        if let Some(anchor) = definition.anchor {
            if !rules::anchor_reached(&anchor, period.period_start) {
                return ChargeEvaluation::from_entry(
                    entry,
                    EvaluationOutcome::Skipped {
                        reason: SkipReason::BeforeAnnualAnchor { anchor },
                    },
                );
            }
        }

        let outcome = match rules::charge_amount(&definition.kind, period, self.settings.rounding)
        {
            Ok(amount) => EvaluationOutcome::Applied { amount },
            Err(defect) => EvaluationOutcome::Invalid {
                defects: vec![defect],
            },
        };
        ChargeEvaluation::from_entry(entry, outcome)
    }
}

/// Why an otherwise valid charge contributed nothing this period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    Inactive,
    BeforeAnnualAnchor { anchor: AnnualAnchor },
}

impl SkipReason {
    pub fn summary(&self) -> String {
        match self {
            SkipReason::Inactive => "charge is inactive".to_string(),
            SkipReason::BeforeAnnualAnchor { anchor } => {
                format!("period starts before the annual anchor {anchor}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationOutcome {
    Applied { amount: Money },
    Skipped { reason: SkipReason },
    Invalid { defects: Vec<ChargeDefect> },
}

impl EvaluationOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            EvaluationOutcome::Applied { .. } => "applied",
            EvaluationOutcome::Skipped { .. } => "skipped",
            EvaluationOutcome::Invalid { .. } => "invalid",
        }
    }

    pub fn applied_amount(&self) -> Option<Money> {
        match self {
            EvaluationOutcome::Applied { amount } => Some(*amount),
            _ => None,
        }
    }
}

/// Result of evaluating one charge, keeping enough identity for the breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeEvaluation {
    pub charge_id: ChargeId,
    pub name: String,
    /// Canonical type label when the declared type is known, the raw text otherwise.
    pub charge_type: String,
    pub outcome: EvaluationOutcome,
}

impl ChargeEvaluation {
    fn from_entry(entry: &LoadedCharge, outcome: EvaluationOutcome) -> Self {
        let (name, charge_type) = match entry {
            LoadedCharge::Valid(definition) => (
                definition.name.clone(),
                definition.charge_type().label().to_string(),
            ),
            LoadedCharge::Invalid(invalid) => (
                invalid.name.clone(),
                invalid
                    .declared_type
                    .parse::<ChargeType>()
                    .map(|charge_type| charge_type.label().to_string())
                    .unwrap_or_else(|_| invalid.declared_type.clone()),
            ),
        };

        Self {
            charge_id: entry.charge_id().clone(),
            name,
            charge_type,
            outcome,
        }
    }

    pub(crate) fn as_invalid(&self) -> Option<InvalidCharge> {
        match &self.outcome {
            EvaluationOutcome::Invalid { defects } => Some(InvalidCharge {
                charge_id: self.charge_id.clone(),
                name: self.name.clone(),
                declared_type: self.charge_type.clone(),
                is_active: true,
                defects: defects.clone(),
            }),
            _ => None,
        }
    }
}
