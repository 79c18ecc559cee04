//! Route definitions for games, mounted at `/games`.
//!
//! ```text
//! GET    /                              list
//! POST   /                              create (multipart)
//! GET    /usable                        usable
//! GET    /{id}                          get_by_id
//! PUT    /{id}                          update (multipart)
//! DELETE /{id}                          delete
//!
//! GET    /{id}/game-infos               field_definition::list_game_infos
//! POST   /{id}/game-infos               field_definition::create_game_info
//! GET    /{id}/account-types            account_type::list_by_game
//! POST   /{id}/account-types            account_type::create
//! POST   /{id}/discount-codes/{code}    discount_code::support_game
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{account_type, discount_code, field_definition, game};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(game::list).post(game::create))
        .route("/usable", get(game::usable))
        .route(
            "/{id}",
            get(game::get_by_id).put(game::update).delete(game::delete),
        )
        .route(
            "/{id}/game-infos",
            get(field_definition::list_game_infos).post(field_definition::create_game_info),
        )
        .route(
            "/{id}/account-types",
            get(account_type::list_by_game).post(account_type::create),
        )
        .route(
            "/{id}/discount-codes/{code}",
            post(discount_code::support_game),
        )
}
