pub mod account;
pub mod account_type;
pub mod discount_code;
pub mod field_definition;
pub mod game;
pub mod health;
pub mod role;
pub mod rule;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /roles                                           list
///
/// /rules                                           list, create
/// /rules/{id}                                      get, replace, delete
/// /rules/{id}/generate                             preview for a role (GET)
///
/// /games                                           list, create
/// /games/usable                                    games open to the actor's roles
/// /games/{id}                                      get, update, delete
/// /games/{id}/game-infos                           list, create
/// /games/{id}/account-types                        list, create
/// /games/{id}/discount-codes/{code}                attach code (POST)
/// /game-infos/{id}                                 delete
///
/// /account-types/{id}                              get
/// /account-types/{id}/account-infos                list, create
/// /account-types/{id}/account-actions              list, create
/// /account-types/{id}/fees                         list, create
/// /account-types/{id}/accounts                     submit account (POST)
/// /account-infos/{id}                              delete
/// /account-actions/{id}                            get, update, delete
///
/// /accounts                                        list (search, paginated)
/// /accounts/manage                                 actor's own accounts; admin sees all
/// /accounts/{id}                                   get, update
/// /accounts/{id}/approve                           approve (POST)
/// /accounts/{id}/price                             price quote (GET)
///
/// /discount-codes                                  list, create
/// /discount-codes/{code}                           get, update, delete
/// /discount-codes/{code}/buy                       buy (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/roles", role::router())
        .nest("/rules", rule::router())
        .nest("/games", game::router())
        .nest("/game-infos", field_definition::game_info_router())
        .nest("/account-types", account_type::router())
        .nest("/account-infos", field_definition::account_info_router())
        .nest("/account-actions", field_definition::account_action_router())
        .nest("/accounts", account::router())
        .nest("/discount-codes", discount_code::router())
}
