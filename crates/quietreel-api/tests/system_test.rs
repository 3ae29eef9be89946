//! Ping, demo, health and static frontend tests.
//!
//! Run with: `cargo test -p quietreel-api --test system_test`

mod helpers;

use helpers::{setup_test_app, setup_test_app_with, MockMode};
use quietreel_core::models::{DemoResponse, PingResponse};

#[tokio::test]
async fn test_ping() {
    let app = setup_test_app(MockMode::Strip).await;

    let response = app.client().get("/api/ping").await;

    assert_eq!(response.status_code(), 200);
    let body: PingResponse = response.json();
    assert_eq!(body.message, "pong");
}

#[tokio::test]
async fn test_ping_message_is_configurable() {
    let app = setup_test_app_with(MockMode::Strip, |config| {
        config.base.ping_message = "ping pong".to_string();
    })
    .await;

    let body: PingResponse = app.client().get("/api/ping").await.json();
    assert_eq!(body.message, "ping pong");
}

#[tokio::test]
async fn test_demo() {
    let app = setup_test_app(MockMode::Strip).await;

    let response = app.client().get("/api/demo").await;

    assert_eq!(response.status_code(), 200);
    let body: DemoResponse = response.json();
    assert_eq!(body.message, "Hello from the backend server! 🚀");
    assert_eq!(body.environment.as_deref(), Some("test"));
    assert!(body.timestamp.is_some());
}

#[tokio::test]
async fn test_liveness() {
    let app = setup_test_app(MockMode::Strip).await;

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_static_frontend_with_spa_fallback() {
    let frontend = tempfile::tempdir().unwrap();
    std::fs::write(frontend.path().join("index.html"), "<html>app</html>").unwrap();
    std::fs::write(frontend.path().join("app.js"), "console.log(1)").unwrap();
    let static_dir = frontend.path().to_path_buf();

    let app = setup_test_app_with(MockMode::Strip, move |config| {
        config.base.static_dir = Some(static_dir);
    })
    .await;

    let asset = app.client().get("/app.js").await;
    assert_eq!(asset.status_code(), 200);
    assert_eq!(asset.text(), "console.log(1)");

    let route = app.client().get("/videos/recent").await;
    assert_eq!(route.status_code(), 200);
    assert_eq!(route.text(), "<html>app</html>");

    // API routes still win over the frontend
    let ping: PingResponse = app.client().get("/api/ping").await.json();
    assert_eq!(ping.message, "pong");
}

#[tokio::test]
async fn test_unknown_route_without_frontend_is_not_found() {
    let app = setup_test_app(MockMode::Strip).await;

    let response = app.client().get("/videos/recent").expect_failure().await;

    assert_eq!(response.status_code(), 404);
}
