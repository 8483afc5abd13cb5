//! API Middleware
//!
//! Bearer-token authentication and request-duration metrics.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::handlers::AppState;
use crate::error::{ApiError, Result};

/// Rejects requests whose `Authorization: Bearer <token>` doesn't match the state's token.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let path = request.uri().path().to_string();

    let Some(auth) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        warn!(path = %path, "Request without authorization header");
        return Err(ApiError::Unauthorized(
            "Authorization header is required".to_string(),
        ));
    };

    let token = auth.strip_prefix("Bearer ").unwrap_or(auth);
    if token != &*state.auth_token {
        warn!(path = %path, "Invalid token provided");
        return Err(ApiError::Unauthorized("Invalid token".to_string()));
    }

    Ok(next.run(request).await)
}

/// Label used when no route template matched the request.
const UNMATCHED_PATH: &str = "unmatched";

/// Observes every routed request in `http_request_duration_seconds`.
///
/// The `path` label is the route template (`/cache/:key`), never the raw
/// URI, so the number of series is bounded by the number of routes.
pub async fn track_duration(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string());

    let response = next.run(request).await;

    state.metrics.observe_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}
