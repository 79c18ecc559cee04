//! Route definitions for roles, mounted at `/roles`.
//!
//! ```text
//! GET    /                              list
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::role;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(role::list))
}
