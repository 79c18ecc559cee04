//! Liveness and readiness at `/health`, outside `/api/v1`.
//!
//! Listing and buying need the database; account and game submissions also
//! need the upload store. Both are checked on every call and the endpoint
//! answers 503 while either is unavailable.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when every dependency is up, otherwise `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub database: bool,
    pub storage: bool,
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = market_db::health_check(&state.pool).await.is_ok();
    let storage = state.files.is_ready().await;

    let (code, status) = if database && storage {
        (StatusCode::OK, "ok")
    } else {
        tracing::warn!(database, storage, "Health check degraded");
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
            storage,
        }),
    )
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
