use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::ReportingConfig;

use super::catalog::ProgrammeCatalog;
use super::classifier::DeviationStatus;
use super::domain::{Programme, ReportAction, ReportDraft};
use super::store::{ReportRecord, ReportStore, StoreAck, StoreError};
use super::validation::{DraftAssessment, SubmissionValidator, ValidationError};
use super::variance::{compute_variance, format_quantity};

/// Service composing the catalog, the validator, and the storage collaborator.
///
/// Validation always runs before storage is contacted, and the same rules gate
/// both saving a draft and submitting.
pub struct ReportingService<S> {
    catalog: Arc<ProgrammeCatalog>,
    validator: SubmissionValidator,
    store: Arc<S>,
    persistence_timeout: Duration,
}

impl<S> ReportingService<S>
where
    S: ReportStore + 'static,
{
    pub fn new(catalog: Arc<ProgrammeCatalog>, store: Arc<S>, config: &ReportingConfig) -> Self {
        Self {
            catalog,
            validator: SubmissionValidator::new(&config.validation),
            store,
            persistence_timeout: config.persistence_timeout,
        }
    }

    pub fn catalog(&self) -> &ProgrammeCatalog {
        &self.catalog
    }

    pub fn validator(&self) -> &SubmissionValidator {
        &self.validator
    }

    pub fn validate(&self, draft: &ReportDraft) -> Vec<ValidationError> {
        self.validator.validate(draft, &self.catalog)
    }

    pub fn assess(&self, draft: &ReportDraft) -> DraftAssessment {
        self.validator.assess(draft, &self.catalog)
    }

    /// Persist the draft for later; the draft itself is left untouched.
    pub async fn save_draft(
        &self,
        draft: &ReportDraft,
    ) -> Result<StoreAck, ReportingServiceError> {
        let (record, programme) = self.prepare(draft)?;
        let status = record.status;
        let ack = self
            .persist(ReportAction::SaveDraft, self.store.save_draft(record))
            .await?;

        info!(
            programme_id = %programme.id,
            action = %ReportAction::SaveDraft,
            status = status.label(),
            reference = %ack.reference,
            "report draft saved"
        );
        Ok(ack)
    }

    /// Submit the report and describe what was filed.
    pub async fn submit(
        &self,
        draft: &ReportDraft,
    ) -> Result<SubmissionReceipt, ReportingServiceError> {
        let (record, programme) = self.prepare(draft)?;
        let receipt_basis = record.clone();
        let ack = self
            .persist(ReportAction::Submit, self.store.submit_report(record))
            .await?;

        info!(
            programme_id = %programme.id,
            action = %ReportAction::Submit,
            status = receipt_basis.status.label(),
            reference = %ack.reference,
            "report submitted"
        );
        Ok(SubmissionReceipt::new(programme, &receipt_basis, ack))
    }

    fn prepare(
        &self,
        draft: &ReportDraft,
    ) -> Result<(ReportRecord, &Programme), ReportingServiceError> {
        let errors = self.validate(draft);
        if !errors.is_empty() {
            debug!(
                programme_id = ?draft.programme_id,
                errors = errors.len(),
                "report draft failed validation"
            );
            return Err(ReportingServiceError::Validation(errors));
        }

        let programme = draft
            .programme_id
            .and_then(|id| self.catalog.find(id))
            .ok_or_else(|| {
                ReportingServiceError::Validation(vec![ValidationError::MissingProgramme])
            })?;
        let actual = draft.parsed_actual().ok_or_else(|| {
            ReportingServiceError::Validation(vec![ValidationError::InvalidActualValue])
        })?;

        let figures = compute_variance(programme.target, actual);
        let status = self.validator.classifier().classify_figures(&figures);
        let explanation = draft.deviation_explanation.trim();

        let record = ReportRecord {
            programme_id: programme.id,
            quarter: programme.quarter.clone(),
            target: programme.target,
            actual_value: actual,
            variance: figures.variance,
            variance_percent: figures.percent,
            status,
            deviation_explanation: (!explanation.is_empty()).then(|| explanation.to_string()),
            prepared_at: Utc::now(),
        };

        Ok((record, programme))
    }

    async fn persist<F>(
        &self,
        action: ReportAction,
        call: F,
    ) -> Result<StoreAck, ReportingServiceError>
    where
        F: std::future::Future<Output = Result<StoreAck, StoreError>>,
    {
        match timeout(self.persistence_timeout, call).await {
            Ok(Ok(ack)) => Ok(ack),
            Ok(Err(err)) => {
                warn!(%action, error = %err, "report storage call failed");
                Err(ReportingServiceError::Store(err))
            }
            Err(_) => {
                warn!(
                    %action,
                    timeout_ms = self.persistence_timeout.as_millis() as u64,
                    "report storage call timed out"
                );
                Err(ReportingServiceError::Timeout {
                    action,
                    after: self.persistence_timeout,
                })
            }
        }
    }
}

/// Confirmation shown after a successful submit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReceipt {
    pub reference: String,
    pub programme_name: String,
    pub actual_display: String,
    pub variance_summary: String,
    pub status: DeviationStatus,
}

impl SubmissionReceipt {
    fn new(programme: &Programme, record: &ReportRecord, ack: StoreAck) -> Self {
        let figures = compute_variance(record.target, record.actual_value);
        Self {
            reference: ack.reference,
            programme_name: programme.name.clone(),
            actual_display: format!(
                "{} {}",
                format_quantity(record.actual_value),
                programme.unit
            ),
            variance_summary: figures.summary(&programme.unit),
            status: record.status,
        }
    }

    pub fn message(&self) -> String {
        format!(
            "Report submitted successfully for {}. Actual: {}. Variance: {}",
            self.programme_name, self.actual_display, self.variance_summary
        )
    }
}

/// Error raised by the reporting service.
#[derive(Debug, thiserror::Error)]
pub enum ReportingServiceError {
    #[error("report failed validation: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),
    #[error("could not reach report storage, please retry: {0}")]
    Store(#[from] StoreError),
    #[error("report storage did not respond to {action} within {after:?}, please retry")]
    Timeout { action: ReportAction, after: Duration },
}

impl ReportingServiceError {
    /// Storage failures keep the draft intact and may be retried as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ReportingServiceError::Store(_) | ReportingServiceError::Timeout { .. }
        )
    }

    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            ReportingServiceError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
