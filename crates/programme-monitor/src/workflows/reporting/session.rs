use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::warn;

use super::domain::{ProgrammeId, ReportAction, ReportDraft};
use super::service::{ReportingService, ReportingServiceError, SubmissionReceipt};
use super::store::{ReportStore, StoreAck};
use super::validation::{DraftAssessment, ValidationError};

/// One reporter's form: the current draft, the errors from the last save or
/// submit attempt, and the in-flight flag that disables both buttons.
pub struct ReportSession<S> {
    service: Arc<ReportingService<S>>,
    state: Mutex<FormState>,
    submitting: AtomicBool,
}

#[derive(Debug, Default)]
struct FormState {
    draft: ReportDraft,
    errors: Vec<ValidationError>,
}

/// Everything the presentation layer renders for the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub draft: ReportDraft,
    /// Errors from the last save/submit attempt.
    pub errors: Vec<ValidationError>,
    /// Live re-assessment of the current draft.
    pub assessment: DraftAssessment,
    pub is_submitting: bool,
}

impl<S> ReportSession<S>
where
    S: ReportStore + 'static,
{
    pub fn new(service: Arc<ReportingService<S>>) -> Self {
        Self {
            service,
            state: Mutex::new(FormState::default()),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn draft(&self) -> ReportDraft {
        self.lock().draft.clone()
    }

    pub fn errors(&self) -> Vec<ValidationError> {
        self.lock().errors.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let (draft, errors) = {
            let state = self.lock();
            (state.draft.clone(), state.errors.clone())
        };
        let assessment = self.service.assess(&draft);

        SessionSnapshot {
            draft,
            errors,
            assessment,
            is_submitting: self.is_submitting(),
        }
    }

    /// Switching programme starts a fresh entry and clears shown errors.
    pub fn select_programme(&self, programme_id: ProgrammeId) -> DraftAssessment {
        let mut state = self.lock();
        state.draft = std::mem::take(&mut state.draft).with_programme(programme_id);
        state.errors.clear();
        self.service.assess(&state.draft)
    }

    pub fn set_actual_value(&self, raw: impl Into<String>) -> DraftAssessment {
        let mut state = self.lock();
        state.draft = std::mem::take(&mut state.draft).with_actual_value(raw);
        self.service.assess(&state.draft)
    }

    pub fn set_explanation(&self, text: impl Into<String>) -> DraftAssessment {
        let mut state = self.lock();
        state.draft = std::mem::take(&mut state.draft).with_explanation(text);
        self.service.assess(&state.draft)
    }

    pub fn reset(&self) {
        *self.lock() = FormState::default();
    }

    pub async fn save_draft(&self) -> Result<StoreAck, SessionError> {
        let _in_flight = self.begin(ReportAction::SaveDraft)?;
        let draft = self.draft();

        match self.service.save_draft(&draft).await {
            Ok(ack) => {
                self.lock().errors.clear();
                Ok(ack)
            }
            Err(err) => Err(self.record_failure(err)),
        }
    }

    /// On success the form resets to its empty initial state.
    pub async fn submit(&self) -> Result<SubmissionReceipt, SessionError> {
        let _in_flight = self.begin(ReportAction::Submit)?;
        let draft = self.draft();

        match self.service.submit(&draft).await {
            Ok(receipt) => {
                self.reset();
                Ok(receipt)
            }
            Err(err) => Err(self.record_failure(err)),
        }
    }

    fn begin(&self, action: ReportAction) -> Result<InFlight<'_>, SessionError> {
        InFlight::acquire(&self.submitting).ok_or_else(|| {
            warn!(%action, "rejected while another save or submit is pending");
            SessionError::SubmissionInProgress
        })
    }

    fn record_failure(&self, err: ReportingServiceError) -> SessionError {
        if let ReportingServiceError::Validation(errors) = &err {
            self.lock().errors = errors.clone();
        }
        SessionError::Service(err)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FormState> {
        self.state.lock().expect("session mutex poisoned")
    }
}

/// Holds the in-flight flag; dropping it (including on cancellation) clears it.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Error raised by a report session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("a save or submit is already in progress")]
    SubmissionInProgress,
    #[error(transparent)]
    Service(#[from] ReportingServiceError),
}

impl SessionError {
    pub fn is_retryable(&self) -> bool {
        match self {
            SessionError::SubmissionInProgress => true,
            SessionError::Service(err) => err.is_retryable(),
        }
    }

    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            SessionError::SubmissionInProgress => &[],
            SessionError::Service(err) => err.validation_errors(),
        }
    }
}
