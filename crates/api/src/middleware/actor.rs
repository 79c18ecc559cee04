//! Acting-user extractor for Axum handlers.
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! user id in [`ACTOR_HEADER`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use market_core::error::CoreError;
use market_core::roles::{resolve_role, RoleKey};
use market_core::types::DbId;
use market_db::repositories::{RoleRepo, UserRepo};

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the acting user's id.
pub const ACTOR_HEADER: &str = "x-user-id";

/// The user a request is made on behalf of.
///
/// ```ignore
/// async fn my_handler(actor: Actor) -> AppResult<Json<()>> {
///     tracing::info!(user_id = actor.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: DbId,
    /// Role keys assigned to the user.
    pub role_keys: Vec<String>,
}

impl Actor {
    /// Resolve `requested` against the actor's own roles.
    pub fn resolve_role(&self, requested: &str) -> Result<RoleKey, CoreError> {
        resolve_role(requested, self.role_keys.iter().map(String::as_str))
    }
}

impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::BadRequest(format!("Missing {ACTOR_HEADER} header")))?;

        let user_id: DbId = raw
            .trim()
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid {ACTOR_HEADER} header")))?;

        UserRepo::find_by_id(&state.pool, user_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "User",
                id: user_id,
            }))?;

        let role_keys = RoleRepo::keys_for_user(&state.pool, user_id).await?;

        Ok(Actor { user_id, role_keys })
    }
}
