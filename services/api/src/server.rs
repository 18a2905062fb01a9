use crate::cli::ServeArgs;
use crate::infra::{load_catalog, AppState, InMemoryReportStore};
use crate::routes::with_reporting_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use programme_monitor::config::AppConfig;
use programme_monitor::error::AppError;
use programme_monitor::telemetry;
use programme_monitor::workflows::reporting::ReportingService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = Arc::new(load_catalog(config.reporting.catalog_path.as_deref())?);
    let store = Arc::new(InMemoryReportStore::default());
    let reporting_service = Arc::new(ReportingService::new(catalog, store, &config.reporting));

    let app = with_reporting_routes(reporting_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        threshold_pct = config.reporting.validation.deviation_threshold_pct,
        "programme reporting service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
