//! Route definitions for discount codes, mounted at `/discount-codes`.
//!
//! ```text
//! GET    /                              list
//! POST   /                              create
//! GET    /{code}                        get_by_code
//! PUT    /{code}                        update
//! DELETE /{code}                        delete
//! POST   /{code}/buy                    buy
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::discount_code;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(discount_code::list).post(discount_code::create))
        .route(
            "/{code}",
            get(discount_code::get_by_code)
                .put(discount_code::update)
                .delete(discount_code::delete),
        )
        .route("/{code}/buy", post(discount_code::buy))
}
