//! Route definitions for individual field definitions.
//!
//! Provides three routers:
//! - `game_info_router()` mounted at `/game-infos`
//! - `account_info_router()` mounted at `/account-infos`
//! - `account_action_router()` mounted at `/account-actions`
//!
//! Listing and creation are nested under their owner (see `game` and
//! `account_type`).
//!
//! ```text
//! GAME INFOS:
//! DELETE /{id}                          delete_game_info
//!
//! ACCOUNT INFOS:
//! DELETE /{id}                          delete_account_info
//!
//! ACCOUNT ACTIONS:
//! GET    /{id}                          get_account_action
//! PUT    /{id}                          update_account_action
//! DELETE /{id}                          delete_account_action
//! ```

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::field_definition;
use crate::state::AppState;

pub fn game_info_router() -> Router<AppState> {
    Router::new().route("/{id}", delete(field_definition::delete_game_info))
}

pub fn account_info_router() -> Router<AppState> {
    Router::new().route("/{id}", delete(field_definition::delete_account_info))
}

pub fn account_action_router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        get(field_definition::get_account_action)
            .put(field_definition::update_account_action)
            .delete(field_definition::delete_account_action),
    )
}
