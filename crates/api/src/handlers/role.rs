//! Handlers for the `/roles` resource.

use axum::extract::State;
use axum::Json;
use market_db::models::role::Role;
use market_db::repositories::RoleRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/roles
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Role>>>> {
    let roles = RoleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: roles }))
}
