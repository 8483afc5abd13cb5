//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, get_all_handler, get_handler, health_handler, metrics_handler, set_handler,
    stats_handler, AppState,
};
use super::middleware::{require_bearer, track_duration};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /cache/:key` - Store a JSON value (auth)
/// - `GET /cache/:key` - Retrieve a value (auth)
/// - `DELETE /cache/:key` - Delete a key (auth)
/// - `GET /cache` - Snapshot of all live entries (auth)
/// - `GET /stats` - Cache statistics (auth)
/// - `GET /health` - Health check
/// - `GET /metrics` - Prometheus metrics
///
/// # Middleware
/// - Bearer auth on the protected routes
/// - Request duration histogram on every route, labelled by route template
/// - CORS and request tracing
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = Router::new()
        .route("/cache", get(get_all_handler))
        .route(
            "/cache/:key",
            put(set_handler).get(get_handler).delete(delete_handler),
        )
        .route("/stats", get(stats_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    Router::new()
        .merge(protected)
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), track_duration))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
