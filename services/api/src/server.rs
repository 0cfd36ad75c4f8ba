use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use profile_csv::config::AppConfig;
use profile_csv::error::AppError;
use profile_csv::telemetry;
use profile_csv::workflows::snapshot::HttpSnapshotClient;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    if config.snapshot.trigger_url.is_none() || config.snapshot.dataset_id.is_none() {
        warn!("BD_API_URL or DATASET_ID is not set; /api/convert will fail until configured");
    }
    let snapshot_service = Arc::new(HttpSnapshotClient::new(config.snapshot.clone())?);

    let app = with_service_routes(snapshot_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "profile csv service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
