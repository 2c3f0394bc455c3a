//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint through the router.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use distcache::{api::create_router, cache::CacheStore, AppState};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    let cache = CacheStore::new(Duration::from_millis(100));
    create_router(AppState::new(cache))
}

async fn send(app: &Router, method: &str, uri: &str, body: Body) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

fn to_json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app();

    let (status, _) = send(&app, "POST", "/set?key=test_key", Body::from("test_value")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/get?key=test_key", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"test_value");
}

#[tokio::test]
async fn test_set_endpoint_with_ttl() {
    let app = create_test_app();

    let (status, _) = send(&app, "POST", "/set?key=ttl_key&ttl=1m30s", Body::from("v")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/has?key=ttl_key", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_set_endpoint_missing_key() {
    let app = create_test_app();

    let (status, body) = send(&app, "POST", "/set?ttl=30s", Body::from("v")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(to_json(&body)["error"].as_str().unwrap().contains("Invalid Key"));

    let (status, _) = send(&app, "POST", "/set?key=&ttl=30s", Body::from("v")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_set_endpoint_invalid_ttl() {
    let app = create_test_app();

    let (status, body) = send(&app, "POST", "/set?key=k&ttl=soon", Body::from("v")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(to_json(&body)["error"].as_str().unwrap().contains("Invalid TTL"));
}

#[tokio::test]
async fn test_set_endpoint_negative_ttl_keeps_value() {
    let app = create_test_app();

    send(&app, "POST", "/set?key=k", Body::from("original")).await;
    let (status, _) = send(&app, "POST", "/set?key=k&ttl=-5s", Body::from("new")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, "GET", "/get?key=k", Body::empty()).await;
    assert_eq!(body, b"original");
}

#[tokio::test]
async fn test_set_endpoint_binary_body() {
    let app = create_test_app();
    let payload = vec![0u8, 255, 1, 254, 10, 13];

    send(&app, "POST", "/set?key=bin", Body::from(payload.clone())).await;

    let (status, body) = send(&app, "GET", "/get?key=bin", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, payload);
}

#[tokio::test]
async fn test_set_endpoint_body_over_limit() {
    let mut state = AppState::new(CacheStore::new(Duration::from_millis(100)));
    state.max_body_bytes = 8;
    let app = create_router(state);

    let (status, _) = send(&app, "POST", "/set?key=big", Body::from("0123456789")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(&app, "GET", "/has?key=big", Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let (status, _) = send(&app, "GET", "/get?key=nonexistent_key", Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_endpoint_missing_key() {
    let app = create_test_app();

    let (status, _) = send(&app, "GET", "/get", Body::empty()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_endpoint_percent_encoded_key() {
    let app = create_test_app();

    send(&app, "POST", "/set?key=user%3A42%20name", Body::from("alice")).await;

    let (status, body) = send(&app, "GET", "/get?key=user%3A42%20name", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"alice");
}

#[tokio::test]
async fn test_non_utf8_keys_do_not_collide() {
    let cache = CacheStore::new(Duration::from_millis(100));
    let state = AppState::new(cache);
    let app = create_router(state.clone());

    let (status, _) = send(&app, "POST", "/set?key=%FF", Body::from("first")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "POST", "/set?key=%FE", Body::from("second")).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(state.cache.len(), 2);

    let (status, body) = send(&app, "GET", "/get?key=%FF", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"first");

    let (_, body) = send(&app, "GET", "/get?key=%FE", Body::empty()).await;
    assert_eq!(body, b"second");
}

#[tokio::test]
async fn test_repeated_key_param_uses_first() {
    let app = create_test_app();

    let (status, _) = send(&app, "POST", "/set?key=a&key=b", Body::from("v")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/has?key=a", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/has?key=b", Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Malformed queries still answer with a JSON error body
    let (status, body) = send(&app, "GET", "/get?key&key=", Body::empty()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(to_json(&body)["error"].is_string());
}

#[tokio::test]
async fn test_get_endpoint_after_expiry() {
    let app = create_test_app();

    send(&app, "POST", "/set?key=short&ttl=30ms", Body::from("v")).await;
    tokio::time::sleep(Duration::from_millis(60)).await;

    // No reaper running: visibility must not depend on a sweep
    let (status, _) = send(&app, "GET", "/get?key=short", Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// == HAS Endpoint Tests ==

#[tokio::test]
async fn test_has_endpoint() {
    let app = create_test_app();
    send(&app, "POST", "/set?key=present", Body::from("v")).await;

    let (status, body) = send(&app, "GET", "/has?key=present", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"true");

    let (status, body) = send(&app, "GET", "/has?key=absent", Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"false");

    let (status, _) = send(&app, "GET", "/has", Body::empty()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint_success() {
    let app = create_test_app();
    send(&app, "POST", "/set?key=delete_key", Body::from("delete_value")).await;

    let (status, _) = send(&app, "DELETE", "/delete?key=delete_key", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/get?key=delete_key", Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_endpoint_absent_key() {
    let app = create_test_app();

    let (status, _) = send(&app, "DELETE", "/delete?key=nonexistent_key", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_endpoint_missing_key() {
    let app = create_test_app();

    let (status, _) = send(&app, "DELETE", "/delete", Body::empty()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// == STATS / HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app();

    send(&app, "POST", "/set?key=stats_key&ttl=1h", Body::from("v")).await;
    send(&app, "GET", "/get?key=stats_key", Body::empty()).await; // hit
    send(&app, "GET", "/get?key=nonexistent", Body::empty()).await; // miss

    let (status, body) = send(&app, "GET", "/stats", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);

    let json = to_json(&body);
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["total_entries"], 1);
    assert_eq!(json["keys_with_ttl"], 1);
    assert_eq!(json["hit_rate"], 0.5);
}

#[tokio::test]
async fn test_health_endpoint_reports_cleanup() {
    let state = AppState::new(CacheStore::new(Duration::from_millis(100)));
    state.cache.start_cleanup().unwrap();
    let app = create_router(state.clone());

    let (status, body) = send(&app, "GET", "/health", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);

    let json = to_json(&body);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["cleanup_running"], true);

    state.cache.stop_cleanup().unwrap().await.unwrap();
}
