use crate::cli::ServeArgs;
use crate::infra::{load_snapshot, AppState};
use crate::routes::with_billing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use concession_billing::billing::BillingEngine;
use concession_billing::config::AppConfig;
use concession_billing::error::AppError;
use concession_billing::telemetry;
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
    if let Some(snapshot) = args.snapshot.take() {
        config.billing.snapshot_path = Some(snapshot);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    if config.billing.snapshot_path.is_none() {
        warn!("no billing snapshot configured; every calculation will report config_not_found");
    }
    let snapshot = Arc::new(load_snapshot(
        config.billing.snapshot_path.as_deref(),
        config.billing.charges_csv_path.as_deref(),
    )?);
    let engine = Arc::new(BillingEngine::new(
        snapshot.clone(),
        snapshot,
        config.billing.engine_settings(),
    ));

    let app = with_billing_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        rounding = config.billing.rounding.label(),
        "concession billing service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
