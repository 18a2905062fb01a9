use serde::{Deserialize, Serialize};

use super::variance::VarianceFigures;

pub const DEFAULT_DEVIATION_THRESHOLD_PCT: f64 = 10.0;

/// Severity band for a reported variance. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationStatus {
    SignificantDeviation,
    BelowTarget,
    OnOrAboveTarget,
}

impl DeviationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DeviationStatus::SignificantDeviation => "Significant Deviation",
            DeviationStatus::BelowTarget => "Below Target",
            DeviationStatus::OnOrAboveTarget => "On/Above Target",
        }
    }
}

/// Colouring tier callers derive from the variance percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayTier {
    Critical,
    Warning,
    Normal,
}

impl DisplayTier {
    pub const fn label(self) -> &'static str {
        match self {
            DisplayTier::Critical => "critical",
            DisplayTier::Warning => "warning",
            DisplayTier::Normal => "normal",
        }
    }
}

/// Threshold dial shared by the status badge, the display tier and the
/// explanation requirement. Exceeding means strictly greater in magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationClassifier {
    threshold_pct: f64,
}

impl DeviationClassifier {
    pub fn new(threshold_pct: f64) -> Self {
        let sanitized = if threshold_pct.is_finite() && threshold_pct > 0.0 {
            threshold_pct
        } else {
            DEFAULT_DEVIATION_THRESHOLD_PCT
        };

        Self {
            threshold_pct: sanitized,
        }
    }

    pub fn threshold_pct(&self) -> f64 {
        self.threshold_pct
    }

    pub fn exceeds_threshold(&self, percent: f64) -> bool {
        percent.abs() > self.threshold_pct
    }

    pub fn classify(&self, variance: f64, percent: f64) -> DeviationStatus {
        if variance < 0.0 && self.exceeds_threshold(percent) {
            DeviationStatus::SignificantDeviation
        } else if variance < 0.0 {
            DeviationStatus::BelowTarget
        } else {
            DeviationStatus::OnOrAboveTarget
        }
    }

    pub fn classify_figures(&self, figures: &VarianceFigures) -> DeviationStatus {
        self.classify(figures.variance, figures.percent)
    }

    pub fn tier(&self, percent: f64) -> DisplayTier {
        if percent < -self.threshold_pct {
            DisplayTier::Critical
        } else if percent < 0.0 {
            DisplayTier::Warning
        } else {
            DisplayTier::Normal
        }
    }
}

impl Default for DeviationClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_DEVIATION_THRESHOLD_PCT)
    }
}

/// Classify with the default 10% threshold.
pub fn classify(variance: f64, percent: f64) -> DeviationStatus {
    DeviationClassifier::default().classify(variance, percent)
}
