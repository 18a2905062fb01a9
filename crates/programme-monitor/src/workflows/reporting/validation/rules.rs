use super::super::catalog::ProgrammeCatalog;
use super::super::classifier::DeviationClassifier;
use super::super::domain::{Programme, ReportDraft};
use super::super::variance::compute_variance;
use super::ValidationError;

/// Every rule runs; nothing short-circuits.
pub(crate) fn collect_errors(
    draft: &ReportDraft,
    catalog: &ProgrammeCatalog,
    classifier: &DeviationClassifier,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let programme = selected_programme(draft, catalog, &mut errors);

    let actual = draft.parsed_actual();
    if actual.is_none() {
        errors.push(ValidationError::InvalidActualValue);
    }

    if let (Some(programme), Some(actual)) = (programme, actual) {
        let figures = compute_variance(programme.target, actual);
        if classifier.exceeds_threshold(figures.percent) && !draft.has_explanation() {
            errors.push(ValidationError::MissingDeviationExplanation {
                threshold_pct: classifier.threshold_pct(),
            });
        }
    }

    errors
}

fn selected_programme<'a>(
    draft: &ReportDraft,
    catalog: &'a ProgrammeCatalog,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a Programme> {
    let Some(programme_id) = draft.programme_id else {
        errors.push(ValidationError::MissingProgramme);
        return None;
    };

    let programme = catalog.find(programme_id);
    if programme.is_none() {
        errors.push(ValidationError::UnknownProgramme { programme_id });
    }
    programme
}
