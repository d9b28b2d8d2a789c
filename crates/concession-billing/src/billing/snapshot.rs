use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::charge::ChargeRecord;
use super::domain::{ConfigurationId, ContractId, PaymentConfiguration};
use super::repository::{ChargeStore, ConfigStore, StoreError};

/// Immutable copy of configuration and charge data fetched ahead of a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSnapshot {
    #[serde(default)]
    pub configurations: Vec<PaymentConfiguration>,
    #[serde(default)]
    pub charges: Vec<ChargeRecord>,
}

impl BillingSnapshot {
    pub fn new(configurations: Vec<PaymentConfiguration>, charges: Vec<ChargeRecord>) -> Self {
        Self {
            configurations,
            charges,
        }
    }

    pub fn with_charges<I>(mut self, charges: I) -> Self
    where
        I: IntoIterator<Item = ChargeRecord>,
    {
        self.charges.extend(charges);
        self
    }
}

impl ConfigStore for BillingSnapshot {
    fn find_active(
        &self,
        contract_id: &ContractId,
        as_of: NaiveDate,
    ) -> Result<Vec<PaymentConfiguration>, StoreError> {
        Ok(self
            .configurations
            .iter()
            .filter(|config| {
                &config.contract_id == contract_id && config.is_active && config.covers(as_of)
            })
            .cloned()
            .collect())
    }
}

impl ChargeStore for BillingSnapshot {
    fn list_for(
        &self,
        configuration_id: &ConfigurationId,
    ) -> Result<Vec<ChargeRecord>, StoreError> {
        Ok(self
            .charges
            .iter()
            .filter(|charge| &charge.configuration_id == configuration_id)
            .cloned()
            .collect())
    }
}
