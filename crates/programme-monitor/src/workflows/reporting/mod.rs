//! Quarterly performance reporting: variance against programme targets,
//! deviation classification, and the validation gate in front of the
//! report-storage collaborator.
//!
//! Data flows one way: programme selection, target lookup, actual value,
//! variance, classification, validation, and finally save or submit.

pub mod catalog;
pub mod classifier;
pub mod domain;
pub mod router;
pub mod service;
pub mod session;
pub mod store;
pub mod validation;
pub mod variance;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, ProgrammeCatalog};
pub use classifier::{
    classify, DeviationClassifier, DeviationStatus, DisplayTier, DEFAULT_DEVIATION_THRESHOLD_PCT,
};
pub use domain::{Programme, ProgrammeId, ReportAction, ReportDraft};
pub use router::reporting_router;
pub use service::{ReportingService, ReportingServiceError, SubmissionReceipt};
pub use session::{ReportSession, SessionError, SessionSnapshot};
pub use store::{ReportRecord, ReportStore, StoreAck, StoreError};
pub use validation::{
    DraftAssessment, LiveFigures, SubmissionValidator, ValidationConfig, ValidationError,
};
pub use variance::{compute_variance, VarianceFigures};
