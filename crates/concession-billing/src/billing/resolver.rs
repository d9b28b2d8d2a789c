use chrono::NaiveDate;
use tracing::{debug, warn};

use super::domain::{ConfigurationId, ContractId, PaymentConfiguration};
use super::engine::EngineError;

/// Picks the single active configuration covering `as_of` from the candidates.
///
/// Overlapping active ranges are an upstream data defect and are reported with
/// every conflicting id; the resolver never chooses among them.
pub fn resolve(
    contract_id: &ContractId,
    as_of: NaiveDate,
    candidates: Vec<PaymentConfiguration>,
) -> Result<PaymentConfiguration, EngineError> {
    let mut matching: Vec<PaymentConfiguration> = Vec::new();
    for config in candidates {
        let eligible =
            config.is_active && &config.contract_id == contract_id && config.covers(as_of);
        // Identical rows collapse; rows that share an id but differ stay ambiguous.
        if eligible && !matching.contains(&config) {
            matching.push(config);
        }
    }
    matching.sort_by(|left, right| left.id.cmp(&right.id));

    match matching.len() {
        0 => Err(EngineError::ConfigNotFound {
            contract_id: contract_id.clone(),
            as_of,
        }),
        1 => {
            let config = matching.remove(0);
            debug!(%contract_id, configuration_id = %config.id, %as_of, "configuration resolved");
            Ok(config)
        }
        _ => {
            let configuration_ids: Vec<ConfigurationId> =
                matching.into_iter().map(|config| config.id).collect();
            warn!(%contract_id, %as_of, conflicting = ?configuration_ids, "ambiguous payment configuration");
            Err(EngineError::ConfigAmbiguous {
                contract_id: contract_id.clone(),
                as_of,
                configuration_ids,
            })
        }
    }
}
