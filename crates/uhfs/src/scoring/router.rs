use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use super::domain::UserId;
use super::repository::{AnswerSource, RepositoryError, SnapshotRepository};
use super::service::{UhfsService, UhfsServiceError};

/// Router exposing the score resource: lazy read on GET, recompute with breakdown on POST.
pub fn uhfs_router<A, S>(service: Arc<UhfsService<A, S>>) -> Router
where
    A: AnswerSource + 'static,
    S: SnapshotRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/users/:user_id/uhfs",
            get(snapshot_handler::<A, S>).post(recompute_handler::<A, S>),
        )
        .with_state(service)
}

pub(crate) async fn snapshot_handler<A, S>(
    State(service): State<Arc<UhfsService<A, S>>>,
    Path(user_id): Path<String>,
) -> Response
where
    A: AnswerSource + 'static,
    S: SnapshotRepository + 'static,
{
    let user_id = UserId(user_id);
    let target = user_id.clone();
    run_blocking(user_id, move || service.snapshot_or_recompute(&target)).await
}

pub(crate) async fn recompute_handler<A, S>(
    State(service): State<Arc<UhfsService<A, S>>>,
    Path(user_id): Path<String>,
) -> Response
where
    A: AnswerSource + 'static,
    S: SnapshotRepository + 'static,
{
    let user_id = UserId(user_id);
    let target = user_id.clone();
    run_blocking(user_id, move || service.recompute_with_breakdown(&target)).await
}

/// Service calls wait on the per-user lock and on synchronous storage, so they run on the
/// blocking pool instead of a runtime worker.
async fn run_blocking<T, F>(user_id: UserId, work: F) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce() -> Result<T, UhfsServiceError> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(Ok(body)) => (StatusCode::OK, axum::Json(body)).into_response(),
        Ok(Err(err)) => error_response(&user_id, err),
        Err(join_error) => {
            error!(user_id = %user_id, error = %join_error, "uhfs scoring task failed");
            let payload = json!({
                "user_id": user_id,
                "error": "uhfs scoring task failed",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) fn error_response(user_id: &UserId, error: UhfsServiceError) -> Response {
    match error {
        UhfsServiceError::NotPersisted { snapshot, source } => {
            let payload = json!({
                "error": format!("score computed but not saved: {source}"),
                "persisted": false,
                "snapshot": snapshot,
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
        UhfsServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({
                "user_id": user_id,
                "error": "uhfs score not computed yet",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        unavailable @ (UhfsServiceError::Answers(RepositoryError::Unavailable(_))
        | UhfsServiceError::Repository(RepositoryError::Unavailable(_))) => {
            let payload = json!({
                "error": unavailable.to_string(),
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
