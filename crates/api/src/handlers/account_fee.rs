//! Handlers for account type fee brackets.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use market_core::error::CoreError;
use market_core::types::DbId;
use market_db::models::account_fee::{AccountFee, CreateAccountFee};
use market_db::repositories::{AccountFeeRepo, AccountTypeRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::actor::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

async fn ensure_account_type(state: &AppState, id: DbId) -> AppResult<()> {
    AccountTypeRepo::find_by_id(&state.pool, id)
        .await?
        .map(|_| ())
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AccountType",
            id,
        }))
}

/// GET /api/v1/account-types/{id}/fees
pub async fn list(
    State(state): State<AppState>,
    Path(account_type_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AccountFee>>>> {
    ensure_account_type(&state, account_type_id).await?;
    let fees = AccountFeeRepo::list_by_account_type(&state.pool, account_type_id).await?;
    Ok(Json(DataResponse { data: fees }))
}

/// POST /api/v1/account-types/{id}/fees
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Path(account_type_id): Path<DbId>,
    Json(input): Json<CreateAccountFee>,
) -> AppResult<(StatusCode, Json<DataResponse<AccountFee>>)> {
    ensure_account_type(&state, account_type_id).await?;
    input.validate()?;
    let fee = AccountFeeRepo::create(&state.pool, account_type_id, &input, actor.user_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: fee })))
}
