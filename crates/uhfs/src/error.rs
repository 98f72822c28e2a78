use crate::answers::AnswerImportError;
use crate::config::ConfigError;
use crate::scoring::{RepositoryError, RulesetError, UhfsServiceError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Ruleset(RulesetError),
    Import(AnswerImportError),
    Scoring(UhfsServiceError),
    Json(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Ruleset(err) => write!(f, "ruleset error: {}", err),
            AppError::Import(err) => write!(f, "answer import error: {}", err),
            AppError::Scoring(err) => write!(f, "scoring error: {}", err),
            AppError::Json(err) => write!(f, "invalid JSON: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Ruleset(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Scoring(err) => Some(err),
            AppError::Json(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Import(_) | AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Scoring(UhfsServiceError::Repository(RepositoryError::NotFound)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Scoring(UhfsServiceError::Answers(RepositoryError::Unavailable(_)))
            | AppError::Scoring(UhfsServiceError::Repository(RepositoryError::Unavailable(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Ruleset(_)
            | AppError::Scoring(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut body = json!({ "error": self.to_string() });
        if let AppError::Scoring(err) = &self {
            if let Some(snapshot) = err.unpersisted_snapshot() {
                body["persisted"] = json!(false);
                body["snapshot"] = json!(snapshot);
            }
        }

        (status, Json(body)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<RulesetError> for AppError {
    fn from(value: RulesetError) -> Self {
        Self::Ruleset(value)
    }
}

impl From<AnswerImportError> for AppError {
    fn from(value: AnswerImportError) -> Self {
        Self::Import(value)
    }
}

impl From<UhfsServiceError> for AppError {
    fn from(value: UhfsServiceError) -> Self {
        Self::Scoring(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
