//! Route definitions for accounts, mounted at `/accounts`.
//!
//! ```text
//! GET    /?search=&limit=&offset=       list
//! GET    /manage?search=&limit=&offset= manage
//! GET    /{id}                          get_by_id
//! PUT    /{id}                          update (multipart)
//! POST   /{id}/approve                  approve
//! GET    /{id}/price?discount_code=     price
//! ```
//!
//! Accounts are created under their type: `POST /account-types/{id}/accounts`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::account;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(account::list))
        .route("/manage", get(account::manage))
        .route("/{id}", get(account::get_by_id).put(account::update))
        .route("/{id}/approve", post(account::approve))
        .route("/{id}/price", get(account::price))
}
