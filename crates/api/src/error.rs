//! API errors and their HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fatigue::FatigueError;
use serde::Serialize;
use session::SessionError;
use storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Session {0} not found")]
    NotFound(i64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidConfig(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(_) => {
                tracing::error!(error = %self, "Internal API error");
                "internal server error".to_string()
            }
            _ => {
                tracing::warn!(status = %status, error = %self, "API error");
                self.to_string()
            }
        };

        (
            status,
            Json(ErrorBody {
                code: self.code(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<FatigueError> for ApiError {
    fn from(err: FatigueError) -> Self {
        match err {
            FatigueError::Config(msg) => Self::InvalidConfig(msg),
            FatigueError::Load(e) => Self::InvalidConfig(e.to_string()),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Classifier(e) => e.into(),
            SessionError::Parse { .. } => Self::BadRequest(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(id) => Self::NotFound(id),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fatigue::FatigueConfig;

    #[test]
    fn test_config_error_maps_to_422() {
        let err = FatigueConfig {
            ear_history_length: 0,
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(ApiError::from(err).status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ApiError::from(StorageError::NotFound(7));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Session 7 not found");
    }

    #[test]
    fn test_internal_message_hidden() {
        let response = ApiError::Internal("lock poisoned".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
