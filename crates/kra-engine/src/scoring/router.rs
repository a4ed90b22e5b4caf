use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{Kra, RoleId};
use super::repository::{KraRepository, KraSetView, RepositoryError};
use super::service::{PerformanceService, PerformanceServiceError};
use super::simulation::AchievementOverrides;

/// Router builder exposing KRA configuration and what-if simulation endpoints.
pub fn performance_router<R>(service: Arc<PerformanceService<R>>) -> Router
where
    R: KraRepository + 'static,
{
    Router::new()
        .route("/api/v1/roles", get(roles_handler::<R>))
        .route(
            "/api/v1/roles/:role/kras",
            get(kra_set_handler::<R>).put(configure_handler::<R>),
        )
        .route(
            "/api/v1/roles/:role/thresholds",
            get(thresholds_handler::<R>),
        )
        .route(
            "/api/v1/roles/:role/simulate",
            post(role_simulation_handler::<R>),
        )
        .route("/api/v1/simulate", post(adhoc_simulation_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfigureRequest {
    pub(crate) kras: Vec<Kra>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RoleSimulationRequest {
    #[serde(default)]
    pub(crate) overrides: AchievementOverrides,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdhocSimulationRequest {
    #[serde(default)]
    pub(crate) role: Option<RoleId>,
    pub(crate) kras: Vec<Kra>,
    #[serde(default)]
    pub(crate) overrides: AchievementOverrides,
}

pub(crate) async fn configure_handler<R>(
    State(service): State<Arc<PerformanceService<R>>>,
    Path(role): Path<String>,
    axum::Json(request): axum::Json<ConfigureRequest>,
) -> Response
where
    R: KraRepository + 'static,
{
    match service.configure_role(RoleId(role), request.kras) {
        Ok(set) => (StatusCode::OK, axum::Json(KraSetView::from(&set))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn roles_handler<R>(
    State(service): State<Arc<PerformanceService<R>>>,
) -> Response
where
    R: KraRepository + 'static,
{
    match service.configured_roles() {
        Ok(roles) => (StatusCode::OK, axum::Json(json!({ "roles": roles }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn kra_set_handler<R>(
    State(service): State<Arc<PerformanceService<R>>>,
    Path(role): Path<String>,
) -> Response
where
    R: KraRepository + 'static,
{
    match service.kra_set(&RoleId(role)) {
        Ok(set) => (StatusCode::OK, axum::Json(KraSetView::from(&set))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn thresholds_handler<R>(
    State(service): State<Arc<PerformanceService<R>>>,
    Path(role): Path<String>,
) -> Response
where
    R: KraRepository + 'static,
{
    let view = service.thresholds_for(&RoleId(role));
    (StatusCode::OK, axum::Json(view)).into_response()
}

pub(crate) async fn role_simulation_handler<R>(
    State(service): State<Arc<PerformanceService<R>>>,
    Path(role): Path<String>,
    axum::Json(request): axum::Json<RoleSimulationRequest>,
) -> Response
where
    R: KraRepository + 'static,
{
    match service.simulate_role(&RoleId(role), &request.overrides) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn adhoc_simulation_handler<R>(
    State(service): State<Arc<PerformanceService<R>>>,
    axum::Json(request): axum::Json<AdhocSimulationRequest>,
) -> Response
where
    R: KraRepository + 'static,
{
    match service.simulate_adhoc(request.role.as_ref(), &request.kras, &request.overrides) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: PerformanceServiceError) -> Response {
    let status = match &error {
        PerformanceServiceError::Configuration(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PerformanceServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PerformanceServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
