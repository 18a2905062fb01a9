use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::config::ReportingConfig;
use crate::workflows::reporting::catalog::ProgrammeCatalog;
use crate::workflows::reporting::domain::{Programme, ProgrammeId, ReportAction, ReportDraft};
use crate::workflows::reporting::service::ReportingService;
use crate::workflows::reporting::session::ReportSession;
use crate::workflows::reporting::store::{ReportRecord, ReportStore, StoreAck, StoreError};

pub(super) const OUTREACH: ProgrammeId = ProgrammeId(1);
pub(super) const HUNDRED_TARGET: ProgrammeId = ProgrammeId(10);
pub(super) const ZERO_TARGET: ProgrammeId = ProgrammeId(11);

fn programme(id: ProgrammeId, name: &str, target: f64, unit: &str) -> Programme {
    Programme {
        id,
        name: name.to_string(),
        department: "Department of Health".to_string(),
        indicator: "Residents screened".to_string(),
        quarter: "Q3 2024".to_string(),
        target,
        unit: unit.to_string(),
    }
}

pub(super) fn catalog() -> Arc<ProgrammeCatalog> {
    let programmes = vec![
        programme(OUTREACH, "Community Health Outreach", 1000.0, "people"),
        programme(HUNDRED_TARGET, "Mobile Clinics", 100.0, "clinics"),
        programme(ZERO_TARGET, "Pilot Kiosks", 0.0, "kiosks"),
    ];
    Arc::new(ProgrammeCatalog::new(programmes).expect("fixture catalog is valid"))
}

pub(super) fn reporting_config(timeout: Duration) -> ReportingConfig {
    ReportingConfig {
        persistence_timeout: timeout,
        ..ReportingConfig::default()
    }
}

pub(super) fn draft(programme_id: ProgrammeId, actual: &str) -> ReportDraft {
    ReportDraft::empty()
        .with_programme(programme_id)
        .with_actual_value(actual)
}

pub(super) fn build_service<S>(store: Arc<S>) -> Arc<ReportingService<S>>
where
    S: ReportStore + 'static,
{
    Arc::new(ReportingService::new(
        catalog(),
        store,
        &reporting_config(Duration::from_secs(1)),
    ))
}

pub(super) fn build_session<S>(store: Arc<S>) -> ReportSession<S>
where
    S: ReportStore + 'static,
{
    ReportSession::new(build_service(store))
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    calls: Arc<Mutex<Vec<(ReportAction, ReportRecord)>>>,
}

impl MemoryStore {
    pub(super) fn calls(&self) -> Vec<(ReportAction, ReportRecord)> {
        self.calls.lock().expect("store mutex poisoned").clone()
    }

    fn record(&self, action: ReportAction, record: ReportRecord) -> Result<StoreAck, StoreError> {
        let mut guard = self.calls.lock().expect("store mutex poisoned");
        guard.push((action, record));
        Ok(StoreAck {
            reference: format!("rpt-{:04}", guard.len()),
            stored_at: Utc::now(),
        })
    }
}

impl ReportStore for MemoryStore {
    async fn save_draft(&self, record: ReportRecord) -> Result<StoreAck, StoreError> {
        self.record(ReportAction::SaveDraft, record)
    }

    async fn submit_report(&self, record: ReportRecord) -> Result<StoreAck, StoreError> {
        self.record(ReportAction::Submit, record)
    }
}

pub(super) struct UnavailableStore;

impl ReportStore for UnavailableStore {
    async fn save_draft(&self, _record: ReportRecord) -> Result<StoreAck, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn submit_report(&self, _record: ReportRecord) -> Result<StoreAck, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

/// Answers after `delay`, recording like [`MemoryStore`].
#[derive(Clone)]
pub(super) struct SlowStore {
    pub(super) delay: Duration,
    pub(super) inner: MemoryStore,
}

impl SlowStore {
    pub(super) fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: MemoryStore::default(),
        }
    }
}

impl ReportStore for SlowStore {
    async fn save_draft(&self, record: ReportRecord) -> Result<StoreAck, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.record(ReportAction::SaveDraft, record)
    }

    async fn submit_report(&self, record: ReportRecord) -> Result<StoreAck, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.record(ReportAction::Submit, record)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
