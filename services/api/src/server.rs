use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryKraRepository};
use crate::routes::with_performance_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use kra_engine::config::AppConfig;
use kra_engine::error::AppError;
use kra_engine::scoring::PerformanceService;
use kra_engine::telemetry;
use std::sync::atomic::Ordering;
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

    let engine = config.engine.build_engine()?;
    info!(
        tiers = engine.plan().tiers().len(),
        bonus_rules = engine.plan().bonus_rules().len(),
        role_profiles = engine.resolver().profiles().len(),
        plan = ?config.engine.plan_path,
        "scoring engine configured"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryKraRepository::default());
    let performance_service = Arc::new(PerformanceService::new(repository, engine));

    let app = with_performance_routes(performance_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "KRA performance engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
