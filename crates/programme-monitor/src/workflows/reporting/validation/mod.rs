mod config;
mod rules;

pub use config::ValidationConfig;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::catalog::ProgrammeCatalog;
use super::classifier::{DeviationClassifier, DeviationStatus, DisplayTier};
use super::domain::{ProgrammeId, ReportDraft};
use super::variance::compute_variance;

/// User-correctable input problems. Messages are shown to the reporter verbatim.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select a programme.")]
    MissingProgramme,
    #[error("Programme {programme_id} is not available for reporting.")]
    UnknownProgramme { programme_id: ProgrammeId },
    #[error("Please enter a valid actual value.")]
    InvalidActualValue,
    #[error("Deviation explanation is required when variance exceeds {threshold_pct}%.")]
    MissingDeviationExplanation { threshold_pct: f64 },
}

impl ValidationError {
    pub const fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingProgramme => "missing_programme",
            ValidationError::UnknownProgramme { .. } => "unknown_programme",
            ValidationError::InvalidActualValue => "invalid_actual_value",
            ValidationError::MissingDeviationExplanation { .. } => {
                "missing_deviation_explanation"
            }
        }
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Live figures for the selected programme once the actual value parses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveFigures {
    pub target: f64,
    pub actual: f64,
    pub unit: String,
    pub variance: f64,
    pub percent: f64,
    pub percent_display: f64,
    pub status: DeviationStatus,
    pub status_label: &'static str,
    pub tier: DisplayTier,
}

/// What the presentation layer needs to render and gate the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftAssessment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub figures: Option<LiveFigures>,
    pub explanation_required: bool,
    pub errors: Vec<ValidationError>,
}

impl DraftAssessment {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Stateless validator shared by save-draft and submit.
#[derive(Debug, Clone, Default)]
pub struct SubmissionValidator {
    classifier: DeviationClassifier,
}

impl SubmissionValidator {
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            classifier: DeviationClassifier::new(config.deviation_threshold_pct),
        }
    }

    pub fn classifier(&self) -> &DeviationClassifier {
        &self.classifier
    }

    pub fn validate(&self, draft: &ReportDraft, catalog: &ProgrammeCatalog) -> Vec<ValidationError> {
        rules::collect_errors(draft, catalog, &self.classifier)
    }

    pub fn assess(&self, draft: &ReportDraft, catalog: &ProgrammeCatalog) -> DraftAssessment {
        let programme = draft.programme_id.and_then(|id| catalog.find(id));
        let figures = programme.zip(draft.parsed_actual()).map(|(programme, actual)| {
            let figures = compute_variance(programme.target, actual);
            let status = self.classifier.classify_figures(&figures);
            LiveFigures {
                target: programme.target,
                actual,
                unit: programme.unit.clone(),
                variance: figures.variance,
                percent: figures.percent,
                percent_display: figures.percent_display(),
                status,
                status_label: status.label(),
                tier: self.classifier.tier(figures.percent),
            }
        });

        let explanation_required = figures
            .as_ref()
            .map(|figures| self.classifier.exceeds_threshold(figures.percent))
            .unwrap_or(false);

        DraftAssessment {
            figures,
            explanation_required,
            errors: self.validate(draft, catalog),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ProgrammeCatalog {
        ProgrammeCatalog::standard()
    }

    #[test]
    fn messages_follow_the_configured_threshold() {
        let error = ValidationError::MissingDeviationExplanation { threshold_pct: 10.0 };
        assert_eq!(
            error.to_string(),
            "Deviation explanation is required when variance exceeds 10%."
        );

        let error = ValidationError::MissingDeviationExplanation { threshold_pct: 12.5 };
        assert!(error.to_string().contains("12.5%"));
    }

    #[test]
    fn serializes_code_and_message() {
        let value = serde_json::to_value(ValidationError::InvalidActualValue).expect("serializes");
        assert_eq!(value["code"], "invalid_actual_value");
        assert_eq!(value["message"], "Please enter a valid actual value.");
    }

    #[test]
    fn assessment_omits_figures_until_actual_parses() {
        let validator = SubmissionValidator::default();
        let draft = ReportDraft::empty().with_programme(ProgrammeId(1));

        let assessment = validator.assess(&draft, &catalog());

        assert!(assessment.figures.is_none());
        assert!(!assessment.explanation_required);
        assert_eq!(assessment.errors, vec![ValidationError::InvalidActualValue]);
    }

    #[test]
    fn custom_threshold_moves_the_explanation_boundary() {
        let validator = SubmissionValidator::new(&ValidationConfig {
            deviation_threshold_pct: 20.0,
        });
        let draft = ReportDraft::empty()
            .with_programme(ProgrammeId(1))
            .with_actual_value("850");

        let assessment = validator.assess(&draft, &catalog());

        assert!(assessment.is_valid());
        assert!(!assessment.explanation_required);
        let figures = assessment.figures.expect("figures present");
        assert_eq!(figures.status, DeviationStatus::BelowTarget);
        assert_eq!(figures.tier, DisplayTier::Warning);
    }
}
