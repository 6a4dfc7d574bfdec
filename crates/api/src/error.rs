//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! Bodies are JSON. Server errors carry only a generic `detail` and an opaque
//! `error_id` (the Sentry event id); the underlying cause is logged, never
//! returned.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::discovery::DiscoveryError;

/// A single rejected request parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// The discovery pipeline failed or timed out.
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// One or more request parameters were rejected.
    #[error("Validation failed: {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Single-field validation failure.
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Discovery(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            Self::Database(_) | Self::Discovery(_) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Request error"
                );
                let detail = if matches!(self, Self::Discovery(_)) {
                    "Failed to retrieve products."
                } else {
                    "Internal server error"
                };
                json!({ "detail": detail, "error_id": event_id.simple().to_string() })
            }
            Self::Validation(fields) => {
                tracing::debug!(field_count = fields.len(), "Rejected request parameters");
                json!({ "detail": fields })
            }
            Self::NotFound(message) => json!({ "detail": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 12".to_string());
        assert_eq!(err.to_string(), "Not found: product 12");

        let err = AppError::invalid("lat", "must be between -90 and 90");
        assert_eq!(err.to_string(), "Validation failed: 1 field(s)");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::invalid("max_dist", "unsupported")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Database(
                sqlx::Error::PoolTimedOut
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Discovery(DiscoveryError::Timeout(Duration::from_secs(10)))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_server_error_hides_cause() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "relation \"products\" does not exist".to_string(),
        ));
        let body = body_json(err.into_response()).await;

        assert_eq!(body["detail"], "Internal server error");
        assert!(body["error_id"].is_string());
        assert!(!body.to_string().contains("relation"));
    }

    #[tokio::test]
    async fn test_validation_lists_fields() {
        let err = AppError::Validation(vec![
            FieldError::new("lat", "is required"),
            FieldError::new("sort_order", "unknown sort_order 'up'"),
        ]);
        let body = body_json(err.into_response()).await;

        let detail = body["detail"].as_array().unwrap();
        assert_eq!(detail.len(), 2);
        assert_eq!(detail[0]["field"], "lat");
        assert_eq!(detail[1]["field"], "sort_order");
    }
}
