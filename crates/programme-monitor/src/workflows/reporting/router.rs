use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{ReportAction, ReportDraft};
use super::service::{ReportingService, ReportingServiceError};
use super::store::ReportStore;

/// Router builder exposing the catalog, live assessment, and the gated
/// save/submit actions.
pub fn reporting_router<S>(service: Arc<ReportingService<S>>) -> Router
where
    S: ReportStore + 'static,
{
    Router::new()
        .route("/api/v1/programmes", get(programmes_handler::<S>))
        .route("/api/v1/reports/assess", post(assess_handler::<S>))
        .route("/api/v1/reports/drafts", post(save_draft_handler::<S>))
        .route("/api/v1/reports", post(submit_handler::<S>))
        .with_state(service)
}

pub(crate) async fn programmes_handler<S>(
    State(service): State<Arc<ReportingService<S>>>,
) -> Response
where
    S: ReportStore + 'static,
{
    let payload = json!({ "programmes": service.catalog().programmes() });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn assess_handler<S>(
    State(service): State<Arc<ReportingService<S>>>,
    axum::Json(draft): axum::Json<ReportDraft>,
) -> Response
where
    S: ReportStore + 'static,
{
    let assessment = service.assess(&draft);
    (StatusCode::OK, axum::Json(assessment)).into_response()
}

pub(crate) async fn save_draft_handler<S>(
    State(service): State<Arc<ReportingService<S>>>,
    axum::Json(draft): axum::Json<ReportDraft>,
) -> Response
where
    S: ReportStore + 'static,
{
    match service.save_draft(&draft).await {
        Ok(ack) => {
            let payload = json!({
                "action": ReportAction::SaveDraft.label(),
                "reference": ack.reference,
                "stored_at": ack.stored_at,
            });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<ReportingService<S>>>,
    axum::Json(draft): axum::Json<ReportDraft>,
) -> Response
where
    S: ReportStore + 'static,
{
    match service.submit(&draft).await {
        Ok(receipt) => {
            let payload = json!({
                "action": ReportAction::Submit.label(),
                "message": receipt.message(),
                "receipt": receipt,
            });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: ReportingServiceError) -> Response {
    match error {
        ReportingServiceError::Validation(errors) => {
            let payload = json!({ "errors": errors });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({
                "error": other.to_string(),
                "retryable": other.is_retryable(),
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}
