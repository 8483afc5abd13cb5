//! Error types for the cache server
//!
//! The cache engine itself is total; these errors belong to the HTTP layer
//! and to configuration parsing.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == API Error Enum ==
/// Error returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Key absent or expired; the two are indistinguishable
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or wrong bearer token
    #[error("{0}")]
    Unauthorized(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Unknown eviction strategy name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown eviction strategy '{0}', expected 'lru' or 'lfu'")]
pub struct ParseStrategyError(pub String);

/// Configuration value that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid duration '{0}'")]
    InvalidDuration(String),

    #[error(transparent)]
    InvalidStrategy(#[from] ParseStrategyError),
}
