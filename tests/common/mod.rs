#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, Response};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;

use gestion_pro::config::Config;
use gestion_pro::{router, AppState};

pub const TEST_JWT_SECRET: &str = "test-secret";

/// Test configuration: no SMTP, Outlook pointed at an unroutable host.
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "postgres://localhost/gestion_pro_test".to_string(),
        max_connections: 2,
        cors_origins: Vec::new(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        graph_base_url: "http://127.0.0.1:9".to_string(),
        mail: None,
    }
}

/// The production router over the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    router(AppState::new(pool, test_config()))
}

/// A pool that never connects; for requests rejected before any query runs.
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy("postgres://localhost/gestion_pro_unused")
        .expect("lazy pool")
}

pub fn offline_app() -> Router {
    build_test_app(lazy_pool())
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
