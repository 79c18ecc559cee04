//! Route definitions for rules, mounted at `/rules`.
//!
//! ```text
//! GET    /                              list
//! POST   /                              create
//! GET    /{id}                          get_by_id
//! PUT    /{id}                          update
//! DELETE /{id}                          delete
//! GET    /{id}/generate?role_key=       generate
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::rule;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rule::list).post(rule::create))
        .route(
            "/{id}",
            get(rule::get_by_id).put(rule::update).delete(rule::delete),
        )
        .route("/{id}/generate", get(rule::generate))
}
