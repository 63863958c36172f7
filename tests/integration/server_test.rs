//! Router and startup integration tests

use axum::body::Body;
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use tower::ServiceExt;

use gridcast::backend::routes::create_router;
use gridcast::backend::server::create_app;
use gridcast::backend::store::MemoryBackend;
use gridcast::shared::ServerConfig;

use crate::assert_contains;
use crate::common::{node, TestClient};

const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/static");

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_counts_sessions() {
    let backend = MemoryBackend::new();
    let state = node(&backend).await;
    let _a = TestClient::connect(&state).await;
    let _b = TestClient::connect(&state).await;

    let response = create_router(state, STATIC_DIR)
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, r#"{"status":"ok","sessions":2}"#);
}

#[tokio::test]
async fn test_static_fallback_serves_client() {
    let backend = MemoryBackend::new();
    let state = node(&backend).await;
    let app = create_router(state, STATIC_DIR);

    let response = app
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_contains!(body_string(response).await, "<title>gridcast</title>");

    let response = app
        .oneshot(Request::get("/missing.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_app_on_memory_backend() {
    let config = ServerConfig::builder().static_dir(STATIC_DIR).build().unwrap();
    let app = create_app(&config).await.unwrap();

    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_app_fails_on_unreachable_redis() {
    // Nothing listens on port 1
    let config = ServerConfig::builder()
        .redis_url("redis://127.0.0.1:1")
        .build()
        .unwrap();
    assert!(create_app(&config).await.is_err());
}
