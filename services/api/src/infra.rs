use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use programme_monitor::error::AppError;
use programme_monitor::workflows::reporting::{
    ProgrammeCatalog, ReportAction, ReportRecord, ReportStore, StoreAck, StoreError,
};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local report storage used until a real backend is wired in.
#[derive(Default, Clone)]
pub(crate) struct InMemoryReportStore {
    records: Arc<Mutex<Vec<(ReportAction, ReportRecord)>>>,
}

impl InMemoryReportStore {
    pub(crate) fn records(&self) -> Vec<(ReportAction, ReportRecord)> {
        self.records.lock().expect("report store mutex poisoned").clone()
    }

    fn store(&self, action: ReportAction, record: ReportRecord) -> StoreAck {
        let mut guard = self.records.lock().expect("report store mutex poisoned");
        guard.push((action, record));
        let prefix = match action {
            ReportAction::SaveDraft => "draft",
            ReportAction::Submit => "report",
        };

        StoreAck {
            reference: format!("{prefix}-{:05}", guard.len()),
            stored_at: Utc::now(),
        }
    }
}

impl ReportStore for InMemoryReportStore {
    async fn save_draft(&self, record: ReportRecord) -> Result<StoreAck, StoreError> {
        Ok(self.store(ReportAction::SaveDraft, record))
    }

    async fn submit_report(&self, record: ReportRecord) -> Result<StoreAck, StoreError> {
        Ok(self.store(ReportAction::Submit, record))
    }
}

/// Catalog from the configured CSV, or the built-in programmes when none is set.
pub(crate) fn load_catalog(path: Option<&Path>) -> Result<ProgrammeCatalog, AppError> {
    let catalog = match path {
        Some(path) => {
            let catalog = ProgrammeCatalog::from_path(path)?;
            info!(path = %path.display(), programmes = catalog.len(), "loaded programme catalog");
            catalog
        }
        None => ProgrammeCatalog::standard(),
    };
    Ok(catalog)
}
