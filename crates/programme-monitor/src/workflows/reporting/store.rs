use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classifier::DeviationStatus;
use super::domain::ProgrammeId;

/// Validated report handed to the storage collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub programme_id: ProgrammeId,
    pub quarter: String,
    pub target: f64,
    pub actual_value: f64,
    pub variance: f64,
    pub variance_percent: f64,
    pub status: DeviationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviation_explanation: Option<String>,
    pub prepared_at: DateTime<Utc>,
}

/// Acknowledgement returned by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreAck {
    pub reference: String,
    pub stored_at: DateTime<Utc>,
}

/// Report-storage collaborator. Only success or failure matters to callers.
pub trait ReportStore: Send + Sync {
    fn save_draft(
        &self,
        record: ReportRecord,
    ) -> impl Future<Output = Result<StoreAck, StoreError>> + Send;

    fn submit_report(
        &self,
        record: ReportRecord,
    ) -> impl Future<Output = Result<StoreAck, StoreError>> + Send;
}

/// Failures reported by the storage collaborator. All are retryable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("report storage unavailable: {0}")]
    Unavailable(String),
    #[error("report storage rejected the report: {0}")]
    Rejected(String),
}
