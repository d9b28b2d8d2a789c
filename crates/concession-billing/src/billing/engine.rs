use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use super::breakdown::{self, CalculationResult};
use super::charge::{ChargeRecord, ChargeSet, InvalidCharge};
use super::domain::{
    ConfigurationDefect, ConfigurationId, ContractId, PaymentConfiguration, PeriodError,
    PeriodInput,
};
use super::evaluation::{ChargeEvaluator, EngineSettings};
use super::guarantee;
use super::repository::{ChargeStore, ConfigStore, StoreError};
use super::resolver;

/// Facade composing resolution, evaluation, guarantee enforcement, and assembly.
///
/// Holds no mutable state; one engine may serve any number of concurrent calls.
pub struct BillingEngine<C, S> {
    configs: Arc<C>,
    charges: Arc<S>,
    evaluator: ChargeEvaluator,
}

impl<C, S> BillingEngine<C, S>
where
    C: ConfigStore + 'static,
    S: ChargeStore + 'static,
{
    pub fn new(configs: Arc<C>, charges: Arc<S>, settings: EngineSettings) -> Self {
        Self {
            configs,
            charges,
            evaluator: ChargeEvaluator::new(settings),
        }
    }

    pub fn settings(&self) -> EngineSettings {
        self.evaluator.settings()
    }

    /// Compute the period obligation for a contract, short-circuiting on the first failure.
    pub fn calculate(
        &self,
        contract_id: &ContractId,
        as_of: NaiveDate,
        period: &PeriodInput,
    ) -> Result<CalculationResult, EngineError> {
        period.validate()?;

        let candidates = self.configs.find_active(contract_id, as_of)?;
        let configuration = resolver::resolve(contract_id, as_of, candidates)?;
        let records = self.charges.list_for(&configuration.id)?;

        let result = run_pipeline(&self.evaluator, &configuration, records, period)?;

        info!(
            %contract_id,
            configuration_id = %configuration.id,
            period_start = %period.period_start,
            period_end = %period.period_end,
            subtotal = %result.subtotal,
            final_amount = %result.final_amount,
            guarantee_applied = result.minimum_guarantee_applied,
            "billing calculation completed"
        );
        Ok(result)
    }
}

/// Runs the pipeline for an already-resolved configuration and its stored charge rows.
///
/// Validates `period` itself, since callers here bypass [`BillingEngine::calculate`].
pub fn calculate_for_configuration(
    evaluator: &ChargeEvaluator,
    configuration: &PaymentConfiguration,
    records: Vec<ChargeRecord>,
    period: &PeriodInput,
) -> Result<CalculationResult, EngineError> {
    period.validate()?;
    run_pipeline(evaluator, configuration, records, period)
}

/// Everything after period validation and configuration resolution.
fn run_pipeline(
    evaluator: &ChargeEvaluator,
    configuration: &PaymentConfiguration,
    records: Vec<ChargeRecord>,
    period: &PeriodInput,
) -> Result<CalculationResult, EngineError> {
    let guarantee = configuration
        .minimum_guarantee()
        .map_err(|defect| EngineError::InvalidConfiguration {
            configuration_id: configuration.id.clone(),
            defect,
        })?;

    let charges = ChargeSet::load(records);
    let evaluations = evaluator.evaluate(&charges, period);
    let subtotal = breakdown::subtotal(&evaluations)?;
    let enforcement = guarantee::enforce(guarantee, subtotal)?;

    breakdown::assemble(evaluations, enforcement).map_err(|err| {
        if let EngineError::InvalidChargeDefinition { charges } = &err {
            warn!(
                configuration_id = %configuration.id,
                offending = charges.len(),
                "calculation rejected: invalid charge definitions"
            );
        }
        err
    })
}

/// Typed failure of a calculation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no active payment configuration covers {as_of} for contract {contract_id}")]
    ConfigNotFound {
        contract_id: ContractId,
        as_of: NaiveDate,
    },
    #[error(
        "contract {contract_id} has {} overlapping active configurations on {as_of}: {}",
        .configuration_ids.len(),
        join_ids(.configuration_ids)
    )]
    ConfigAmbiguous {
        contract_id: ContractId,
        as_of: NaiveDate,
        configuration_ids: Vec<ConfigurationId>,
    },
    #[error("invalid charge definitions: {}", join_charges(.charges))]
    InvalidChargeDefinition { charges: Vec<InvalidCharge> },
    #[error("payment configuration {configuration_id} is invalid: {defect}")]
    InvalidConfiguration {
        configuration_id: ConfigurationId,
        defect: ConfigurationDefect,
    },
    #[error(transparent)]
    InvalidPeriod(#[from] PeriodError),
    #[error("calculated amount exceeds the representable range")]
    AmountOverflow,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Stable label for callers and response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::ConfigNotFound { .. } => "config_not_found",
            EngineError::ConfigAmbiguous { .. } => "config_ambiguous",
            EngineError::InvalidChargeDefinition { .. } => "invalid_charge_definition",
            EngineError::InvalidConfiguration { .. } => "invalid_configuration",
            EngineError::InvalidPeriod(_) => "invalid_period",
            EngineError::AmountOverflow => "amount_overflow",
            EngineError::Store(_) => "store_unavailable",
        }
    }

    /// True when the stored billing data must be corrected before a retry can succeed.
    pub fn is_data_defect(&self) -> bool {
        matches!(
            self,
            EngineError::ConfigAmbiguous { .. }
                | EngineError::InvalidChargeDefinition { .. }
                | EngineError::InvalidConfiguration { .. }
        )
    }
}

fn join_ids(ids: &[ConfigurationId]) -> String {
    ids.iter().map(|id| id.0.as_str()).collect::<Vec<_>>().join(", ")
}

fn join_charges(charges: &[InvalidCharge]) -> String {
    charges
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}
