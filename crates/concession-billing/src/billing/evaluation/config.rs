use serde::{Deserialize, Serialize};

use crate::billing::money::RoundingMode;

/// Engine-wide arithmetic settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub rounding: RoundingMode,
}
