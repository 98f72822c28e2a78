use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAnswerStore, InMemorySnapshotStore, IntakeState};
use crate::routes::with_scoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use uhfs::config::AppConfig;
use uhfs::error::AppError;
use uhfs::scoring::UhfsService;
use uhfs::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let ruleset = config.scoring.load_ruleset()?;
    info!(
        ruleset = %ruleset.version,
        source = ?config.scoring.ruleset_path,
        "scoring ruleset loaded"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let answers = Arc::new(InMemoryAnswerStore::default());
    let snapshots = Arc::new(InMemorySnapshotStore::default());
    let service = Arc::new(UhfsService::new(answers.clone(), snapshots, ruleset));
    let intake_state = IntakeState {
        answers,
        service: service.clone(),
    };

    let app = with_scoring_routes(service)
        .layer(Extension(intake_state))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "uhfs scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
