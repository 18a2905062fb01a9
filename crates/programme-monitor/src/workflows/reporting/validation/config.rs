use serde::{Deserialize, Serialize};

use super::super::classifier::DEFAULT_DEVIATION_THRESHOLD_PCT;

/// Validation dials; the threshold is a magnitude in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub deviation_threshold_pct: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            deviation_threshold_pct: DEFAULT_DEVIATION_THRESHOLD_PCT,
        }
    }
}
