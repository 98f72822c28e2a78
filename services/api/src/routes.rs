use crate::infra::{AppState, IntakeState, ScoringService};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, put};
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uhfs::error::AppError;
use uhfs::scoring::{uhfs_router, DomainUpdate, UhfsServiceError, UhfsSnapshot, UserId};

pub(crate) fn with_scoring_routes(service: Arc<ScoringService>) -> axum::Router {
    uhfs_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/users/:user_id/answers", put(answers_endpoint))
        .route("/api/v1/users/:user_id", delete(delete_user_endpoint))
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

/// Intake write for one domain, followed by the mandatory rescore.
pub(crate) async fn answers_endpoint(
    Extension(intake): Extension<IntakeState>,
    Path(user_id): Path<String>,
    Json(update): Json<DomainUpdate>,
) -> Result<Json<UhfsSnapshot>, AppError> {
    let user_id = UserId(user_id);
    let domain = update.domain();

    intake
        .answers
        .apply(&user_id, update)
        .map_err(UhfsServiceError::from)?;
    info!(user_id = %user_id, domain = domain.code(), "answers updated");

    let snapshot = intake.service.recompute(&user_id)?;
    Ok(Json(snapshot))
}

/// Account deletion: drops the user's answers and snapshot.
pub(crate) async fn delete_user_endpoint(
    Extension(intake): Extension<IntakeState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user_id = UserId(user_id);

    intake
        .answers
        .forget(&user_id)
        .map_err(UhfsServiceError::from)?;
    intake.service.purge(&user_id)?;

    Ok(StatusCode::NO_CONTENT)
}
