use serde::Serialize;

use super::domain::MinimumGuarantee;
use super::engine::EngineError;
use super::money::Money;

/// Result of comparing the period subtotal with the contractual floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuaranteeOutcome {
    pub subtotal: Money,
    pub final_amount: Money,
    pub adjustment: Money,
    pub applied: bool,
}

/// Tops the subtotal up to the floor when it falls short. The floor is never prorated.
pub fn enforce(
    guarantee: MinimumGuarantee,
    subtotal: Money,
) -> Result<GuaranteeOutcome, EngineError> {
    let untouched = GuaranteeOutcome {
        subtotal,
        final_amount: subtotal,
        adjustment: Money::ZERO,
        applied: false,
    };

    match guarantee {
        MinimumGuarantee::None => Ok(untouched),
        MinimumGuarantee::Floor(floor) if subtotal >= floor => Ok(untouched),
        MinimumGuarantee::Floor(floor) => {
            let adjustment = floor
                .checked_sub(subtotal)
                .ok_or(EngineError::AmountOverflow)?;
            Ok(GuaranteeOutcome {
                subtotal,
                final_amount: floor,
                adjustment,
                applied: true,
            })
        }
    }
}
