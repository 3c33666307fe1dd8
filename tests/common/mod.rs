use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::SqlitePool;
use todo_auth::{
    app::build_app,
    config::{AppConfig, JwtConfig},
    db,
    state::AppState,
};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Router over a fresh, migrated in-memory database.
pub async fn build_test_app() -> (Router, SqlitePool) {
    let pool = db::connect("sqlite::memory:").await.expect("in-memory pool");
    db::migrate(&pool).await.expect("migrations");

    let config = Arc::new(AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".into()],
        jwt: JwtConfig {
            secret: TEST_SECRET.into(),
        },
    });

    let state = AppState::from_parts(pool.clone(), config);
    (build_app(state), pool)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

pub fn get_with_auth(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).unwrap()
}
