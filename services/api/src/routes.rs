use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use programme_monitor::workflows::reporting::{reporting_router, ReportStore, ReportingService};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_reporting_routes<S>(service: Arc<ReportingService<S>>) -> axum::Router
where
    S: ReportStore + 'static,
{
    reporting_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryReportStore;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use programme_monitor::config::ReportingConfig;
    use programme_monitor::workflows::reporting::ProgrammeCatalog;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app_state(ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        }
    }

    fn app(store: Arc<InMemoryReportStore>, ready: bool) -> axum::Router {
        let service = ReportingService::new(
            Arc::new(ProgrammeCatalog::standard()),
            store,
            &ReportingConfig::default(),
        );
        with_reporting_routes(Arc::new(service)).layer(Extension(app_state(ready)))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_reflects_startup_state() {
        let response = readiness_endpoint(Extension(app_state(false)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = readiness_endpoint(Extension(app_state(true)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn reporting_routes_are_mounted() {
        let store = Arc::new(InMemoryReportStore::default());

        let response = app(store.clone(), true)
            .oneshot(
                Request::get("/api/v1/programmes")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route responds");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["programmes"].as_array().map(Vec::len), Some(5));

        let response = app(store.clone(), true)
            .oneshot(
                Request::post("/api/v1/reports")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({ "programme_id": 1, "actual_value": "950" }).to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("route responds");
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = body_json(response).await;
        assert_eq!(body["receipt"]["reference"], "report-00001");
        assert_eq!(store.records().len(), 1);
    }

    #[tokio::test]
    async fn metrics_are_plain_text() {
        let response = app(Arc::new(InMemoryReportStore::default()), true)
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request"))
            .await
            .expect("route responds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }
}
