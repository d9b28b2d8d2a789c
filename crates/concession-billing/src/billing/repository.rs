use chrono::NaiveDate;

use super::charge::ChargeRecord;
use super::domain::{ConfigurationId, ContractId, PaymentConfiguration};

/// Read access to payment configurations owned by the surrounding application.
///
/// Implementations return candidates only; choosing among them is the resolver's job.
pub trait ConfigStore: Send + Sync {
    fn find_active(
        &self,
        contract_id: &ContractId,
        as_of: NaiveDate,
    ) -> Result<Vec<PaymentConfiguration>, StoreError>;
}

/// Read access to the charge rows of a configuration, in stored order.
pub trait ChargeStore: Send + Sync {
    fn list_for(&self, configuration_id: &ConfigurationId)
        -> Result<Vec<ChargeRecord>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
