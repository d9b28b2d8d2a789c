//! Concession billing: resolve the configuration in force, evaluate each charge,
//! enforce the minimum guarantee, and assemble an ordered, reproducible breakdown.

pub mod breakdown;
pub mod charge;
pub mod domain;
pub mod engine;
pub(crate) mod evaluation;
pub mod guarantee;
pub mod import;
pub mod money;
pub mod repository;
pub mod resolver;
pub mod router;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use breakdown::{BreakdownLine, CalculationResult};
pub use charge::{
    AnnualAnchor, ChargeDefect, ChargeDefinition, ChargeKind, ChargeRecord, ChargeSet,
    ChargeType, InvalidCharge, LoadedCharge,
};
pub use domain::{
    ChargeId, ConfigurationDefect, ConfigurationId, ContractId, MinimumGuarantee,
    PaymentConfiguration, PeriodError, PeriodInput,
};
pub use engine::{calculate_for_configuration, BillingEngine, EngineError};
pub use evaluation::{
    ChargeEvaluation, ChargeEvaluator, EngineSettings, EvaluationOutcome, SkipReason,
};
pub use guarantee::GuaranteeOutcome;
pub use import::{ImportError, RowError, SnapshotImporter};
pub use money::{Money, MoneyError, RoundingMode};
pub use repository::{ChargeStore, ConfigStore, StoreError};
pub use router::{billing_router, CalculationRequest};
pub use snapshot::BillingSnapshot;
