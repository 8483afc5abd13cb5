//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::cache::SharedCache;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::metrics::CacheMetrics;
use crate::models::{
    validate_key, DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse,
    StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache of arbitrary JSON values
    pub cache: SharedCache<Value>,
    /// Prometheus collectors
    pub metrics: Arc<CacheMetrics>,
    /// Bearer token expected on protected routes
    pub auth_token: Arc<str>,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(
        cache: SharedCache<Value>,
        metrics: CacheMetrics,
        auth_token: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            cache,
            metrics: Arc::new(metrics),
            auth_token: auth_token.into(),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> std::result::Result<Self, prometheus::Error> {
        let cache = SharedCache::new(config.capacity, config.expiration, config.strategy);
        Ok(Self::new(
            cache,
            CacheMetrics::new()?,
            config.auth_token.as_str(),
        ))
    }
}

/// Handler for PUT /cache/{key}
///
/// Stores a JSON value under the key. A `ttl` in the body is accepted but
/// ignored: expiration is cache-wide.
pub async fn set_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: std::result::Result<Json<SetRequest>, JsonRejection>,
) -> Result<Json<SetResponse>> {
    let Json(req) = body.map_err(|rejection| {
        error!(key = %key, error = %rejection, "Failed to bind JSON");
        state.metrics.record_operation("set", "error");
        ApiError::InvalidRequest("malformed JSON body".to_string())
    })?;

    if let Some(error_msg) = validate_key(&key) {
        state.metrics.record_operation("set", "error");
        return Err(ApiError::InvalidRequest(error_msg));
    }

    if let Some(ttl) = req.ttl {
        debug!(key = %key, ttl, "per-item ttl ignored, cache-wide expiration applies");
    }

    state.cache.set(key.clone(), req.value).await;
    state.metrics.record_operation("set", "success");
    state.metrics.set_size(state.cache.len().await);

    info!(key = %key, "Item set in cache");
    Ok(Json(SetResponse::new(key)))
}

/// Handler for GET /cache/{key}
///
/// Missing and expired keys both answer 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(&key).await {
        Some(value) => {
            debug!(key = %key, "Cache hit");
            state.metrics.record_lookup(true);
            Ok(Json(GetResponse::new(key, value)))
        }
        None => {
            debug!(key = %key, "Cache miss");
            state.metrics.record_lookup(false);
            Err(ApiError::NotFound(key))
        }
    }
}

/// Handler for GET /cache
///
/// Returns a snapshot of every live entry.
pub async fn get_all_handler(State(state): State<AppState>) -> Json<HashMap<String, Value>> {
    let items = state.cache.get_all().await;
    state.metrics.record_operation("get_all", "success");
    state.metrics.set_size(items.len());
    Json(items)
}

/// Handler for DELETE /cache/{key}
///
/// Idempotent: deleting an absent key still answers 200.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    let removed = state.cache.delete(&key).await;
    state.metrics.record_operation("delete", "success");
    state.metrics.set_size(state.cache.len().await);

    info!(key = %key, removed, "Item deleted from cache");
    Json(DeleteResponse::new(key))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    let (capacity, expiration, strategy) = state.cache.settings().await;

    Json(StatsResponse::new(
        &stats,
        capacity,
        expiration.as_millis(),
        strategy,
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /metrics
///
/// Prometheus text exposition of the state's registry.
pub async fn metrics_handler(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let body = state
        .metrics
        .encode()
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
