//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /cache/:key` - Store a JSON value
//! - `GET /cache/:key` - Retrieve a value by key
//! - `GET /cache` - Retrieve every live entry
//! - `DELETE /cache/:key` - Delete a key
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint
//! - `GET /metrics` - Prometheus metrics

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
