//! Route definitions for account types, mounted at `/account-types`.
//!
//! ```text
//! GET    /{id}                          get_by_id
//! GET    /{id}/account-infos            field_definition::list_account_infos
//! POST   /{id}/account-infos            field_definition::create_account_info
//! GET    /{id}/account-actions          field_definition::list_account_actions
//! POST   /{id}/account-actions          field_definition::create_account_action
//! GET    /{id}/fees                     account_fee::list
//! POST   /{id}/fees                     account_fee::create
//! POST   /{id}/accounts                 account::create (multipart)
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{account, account_fee, account_type, field_definition};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(account_type::get_by_id))
        .route(
            "/{id}/account-infos",
            get(field_definition::list_account_infos)
                .post(field_definition::create_account_info),
        )
        .route(
            "/{id}/account-actions",
            get(field_definition::list_account_actions)
                .post(field_definition::create_account_action),
        )
        .route(
            "/{id}/fees",
            get(account_fee::list).post(account_fee::create),
        )
        .route("/{id}/accounts", post(account::create))
}
