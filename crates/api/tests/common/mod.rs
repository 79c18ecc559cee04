#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use market_core::storage::LocalFileStore;
use market_db::models::user::CreateUser;
use market_db::repositories::UserRepo;
use sqlx::PgPool;
use tower::ServiceExt;

use market_api::config::ServerConfig;
use market_api::middleware::actor::ACTOR_HEADER;
use market_api::router::build_app_router;
use market_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(storage_root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        storage_root: storage_root.to_path_buf(),
        max_upload_bytes: 2 * 1024 * 1024,
    }
}

/// Build the application router with the production middleware stack and
/// files stored under the system temp directory.
pub fn build_test_app(pool: PgPool) -> Router {
    let root = std::env::temp_dir().join("market-api-tests");
    std::fs::create_dir_all(&root).unwrap();
    build_test_app_with_files(pool, &root)
}

/// Build the application router storing uploads under `root`.
pub fn build_test_app_with_files(pool: PgPool, root: &Path) -> Router {
    let config = test_config(root);
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        files: Arc::new(LocalFileStore::new(root)),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Create a user with 100 silver coins and the given roles.
pub async fn seed_user(pool: &PgPool, email: &str, roles: &[&str]) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Tester".to_string(),
            email: email.to_string(),
            silver_coin: Some(100),
            role_keys: roles.iter().map(|s| s.to_string()).collect(),
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: Method, uri: &str, user: Option<i64>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(user) = user {
        builder = builder.header(ACTOR_HEADER, user.to_string());
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_as(app: Router, uri: &str, user: i64) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(ACTOR_HEADER, user.to_string())
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    user: i64,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::POST, uri, Some(user), body)).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    user: i64,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, Some(user), body)).await
}

pub async fn post_empty(app: Router, uri: &str, user: i64) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(ACTOR_HEADER, user.to_string())
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "market-test-boundary";

/// Builder for `multipart/form-data` request bodies.
#[derive(Default)]
pub struct Form {
    body: Vec<u8>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the JSON `payload` field.
    pub fn payload(self, json: serde_json::Value) -> Self {
        self.text("payload", &json.to_string())
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

pub async fn send_form(
    app: Router,
    method: Method,
    uri: &str,
    user: i64,
    form: Form,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(ACTOR_HEADER, user.to_string())
        .body(Body::from(form.finish()))
        .unwrap();
    send(app, request).await
}
