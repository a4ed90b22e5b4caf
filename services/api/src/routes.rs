use crate::infra::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use kra_engine::error::AppError;
use kra_engine::scoring::{
    performance_router, KraRepository, KraSetView, KraSheetImporter, PerformanceService, RoleId,
};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

pub(crate) fn with_performance_routes<R>(service: Arc<PerformanceService<R>>) -> axum::Router
where
    R: KraRepository + 'static,
{
    let import_routes = axum::Router::new()
        .route(
            "/api/v1/roles/:role/kras/import",
            axum::routing::post(kra_sheet_import_endpoint::<R>),
        )
        .with_state(service.clone());

    performance_router(service)
        .merge(import_routes)
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

/// Replaces a role's KRA set from a CSV sheet body.
pub(crate) async fn kra_sheet_import_endpoint<R>(
    State(service): State<Arc<PerformanceService<R>>>,
    Path(role): Path<String>,
    body: String,
) -> Result<Json<KraSetView>, AppError>
where
    R: KraRepository + 'static,
{
    let kras = KraSheetImporter::from_reader(Cursor::new(body.into_bytes()))?;
    let set = service.configure_role(RoleId::new(role), kras)?;
    Ok(Json(KraSetView::from(&set)))
}
