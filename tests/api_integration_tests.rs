//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;
use vibe_hush::{
    api::create_router, metrics::CacheMetrics, AppState, EvictionStrategy, SharedCache,
};

const TOKEN: &str = "test-token";

// == Helper Functions ==

fn create_test_app() -> Router {
    create_app(100, Duration::from_secs(10), EvictionStrategy::Lru)
}

fn create_app(capacity: usize, expiration: Duration, strategy: EvictionStrategy) -> Router {
    let cache = SharedCache::new(capacity, expiration, strategy);
    let state = AppState::new(cache, CacheMetrics::new().unwrap(), TOKEN);
    create_router(state)
}

fn authed(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {TOKEN}"))
}

async fn put_value(app: &Router, key: &str, body: Value) -> StatusCode {
    app.clone()
        .oneshot(
            authed("PUT", &format!("/cache/{key}"))
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

async fn get_key(app: &Router, key: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            authed("GET", &format!("/cache/{key}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == SET / GET ==

#[tokio::test]
async fn test_set_and_get_item() {
    let app = create_test_app();
    let value = json!({"name": "test", "age": 30});

    assert_eq!(put_value(&app, "test-key", json!({ "value": value })).await, StatusCode::OK);

    let (status, json) = get_key(&app, "test-key").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "test-key");
    assert_eq!(json["value"], value);
}

#[tokio::test]
async fn test_get_nonexistent_item() {
    let app = create_test_app();

    let (status, json) = get_key(&app, "non-existent").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_set_overwrites_value() {
    let app = create_test_app();

    put_value(&app, "k", json!({"value": "first"})).await;
    put_value(&app, "k", json!({"value": "second"})).await;

    let (_, json) = get_key(&app, "k").await;
    assert_eq!(json["value"], "second");
}

// == DELETE ==

#[tokio::test]
async fn test_delete_item() {
    let app = create_test_app();

    assert_eq!(put_value(&app, "delete-test", json!({"value": "test"})).await, StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed("DELETE", "/cache/delete-test").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = get_key(&app, "delete-test").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_absent_item_is_ok() {
    let app = create_test_app();
    put_value(&app, "keep", json!({"value": 1})).await;

    let response = app
        .clone()
        .oneshot(authed("DELETE", "/cache/ghost").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let (status, _) = get_key(&app, "keep").await;
    assert_eq!(status, StatusCode::OK);
}

// == GET ALL ==

#[tokio::test]
async fn test_get_all_items() {
    let app = create_test_app();
    put_value(&app, "a", json!({"value": 1})).await;
    put_value(&app, "b", json!({"value": "two"})).await;

    let response = app
        .oneshot(authed("GET", "/cache").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, json!({"a": 1, "b": "two"}));
}

// == Eviction ==

#[tokio::test]
async fn test_lru_eviction_via_api() {
    let app = create_app(3, Duration::from_secs(10), EvictionStrategy::Lru);
    for key in ["a", "b", "c"] {
        put_value(&app, key, json!({"value": key})).await;
    }

    get_key(&app, "a").await;
    put_value(&app, "d", json!({"value": "d"})).await;

    assert_eq!(get_key(&app, "b").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get_key(&app, "a").await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_lfu_eviction_via_api() {
    let app = create_app(3, Duration::from_secs(10), EvictionStrategy::Lfu);
    for key in ["a", "b", "c"] {
        put_value(&app, key, json!({"value": key})).await;
    }

    get_key(&app, "a").await;
    get_key(&app, "a").await;
    get_key(&app, "b").await;
    put_value(&app, "d", json!({"value": "d"})).await;

    assert_eq!(get_key(&app, "c").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get_key(&app, "d").await.0, StatusCode::OK);
}

// == Expiration ==

#[tokio::test]
async fn test_expiration_via_api() {
    let app = create_app(100, Duration::from_millis(50), EvictionStrategy::Lru);

    // per-item ttl is accepted but the cache-wide expiration still applies
    assert_eq!(
        put_value(&app, "x", json!({"value": "soon", "ttl": 3600})).await,
        StatusCode::OK
    );
    assert_eq!(get_key(&app, "x").await.0, StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(get_key(&app, "x").await.0, StatusCode::NOT_FOUND);

    let response = app
        .oneshot(authed("GET", "/cache").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_to_json(response.into_body()).await, json!({}));
}

// == Authentication ==

#[tokio::test]
async fn test_authentication_required() {
    let app = create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/cache/test").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "Authorization header is required");
}

#[tokio::test]
async fn test_invalid_token() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/cache/test")
                .header("authorization", "Bearer invalid-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "Invalid token");
}

// == Error Responses ==

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app();

    let response = app
        .oneshot(
            authed("PUT", "/cache/broken")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"invalid json"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "Invalid request: malformed JSON body");
}

#[tokio::test]
async fn test_missing_value_is_bad_request() {
    let app = create_test_app();

    assert_eq!(put_value(&app, "k", json!({"ttl": 5})).await, StatusCode::BAD_REQUEST);
}

// == STATS / HEALTH / METRICS ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();

    put_value(&app, "stats_key", json!({"value": "stats_value"})).await;
    get_key(&app, "stats_key").await;
    get_key(&app, "nonexistent").await;

    let response = app
        .oneshot(authed("GET", "/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;

    assert_eq!(json["hits"].as_u64().unwrap(), 1);
    assert_eq!(json["misses"].as_u64().unwrap(), 1);
    assert_eq!(json["total_entries"].as_u64().unwrap(), 1);
    assert_eq!(json["strategy"], "lru");
    assert!(json.get("hit_rate").is_some());
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn test_metrics_reflect_traffic() {
    let app = create_test_app();

    put_value(&app, "m", json!({"value": true})).await;
    get_key(&app, "m").await;
    get_key(&app, "missing").await;

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains(r#"cache_operations_total{operation="set",status="success"} 1"#));
    assert!(text.contains(r#"cache_hits_total{result="hit"} 1"#));
    assert!(text.contains(r#"cache_hits_total{result="miss"} 1"#));
    assert!(text.contains("cache_items_current 1"));
    assert!(text.contains("http_request_duration_seconds_bucket"));
}

#[tokio::test]
async fn test_duration_series_bounded_by_routes() {
    let app = create_test_app();

    for i in 0..50 {
        get_key(&app, &format!("key-{i}")).await;
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/junk/{i}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    let series: Vec<&str> = text
        .lines()
        .filter(|line| line.starts_with("http_request_duration_seconds_count{"))
        .collect();
    assert_eq!(series.len(), 1, "{series:?}");
    assert!(series[0].contains(r#"path="/cache/:key""#));
    assert!(series[0].ends_with(" 50"));
    assert!(!text.contains("/junk"));
    assert!(!text.contains("key-1"));
}

// == Served over TCP ==

#[tokio::test]
async fn test_served_over_tcp() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, create_test_app()).await.unwrap();
    });

    let client = reqwest::Client::new();
    let base = format!("http://{addr}");

    let response = client
        .put(format!("{base}/cache/net"))
        .bearer_auth(TOKEN)
        .json(&json!({"value": [1, 2, 3]}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: Value = client
        .get(format!("{base}/cache/net"))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["value"], json!([1, 2, 3]));

    let response = client.get(format!("{base}/cache/net")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    server.abort();
}
