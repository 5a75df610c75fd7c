//! Unified API error type
//!
//! All handler and service fall-through errors funnel into `ApiError`, which
//! renders as a JSON body with a stable error code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Result alias used across handlers and services
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Warehouse connection failed: {0}")]
    WarehouseConnection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation_error(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn warehouse_connection_failed(msg: impl Into<String>) -> Self {
        Self::WarehouseConnection(msg.into())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::WarehouseConnection(_) => "WAREHOUSE_CONNECTION_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::WarehouseConnection(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("API error: {}", self);
        } else {
            tracing::debug!("API error: {}", self);
        }
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));
        (status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<mysql_async::Error> for ApiError {
    fn from(err: mysql_async::Error) -> Self {
        Self::WarehouseConnection(err.to_string())
    }
}
