//! Handlers for account types, nested under games.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use market_core::account_status::validate_initial_status;
use market_core::error::CoreError;
use market_core::slug::slug_or_generate;
use market_core::types::DbId;
use market_db::models::account_fee::AccountFee;
use market_db::models::account_type::{AccountType, AccountTypeRole, CreateAccountType};
use market_db::repositories::{AccountFeeRepo, AccountTypeRepo, GameRepo};
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::actor::Actor;
use crate::response::DataResponse;
use crate::services::games::ensure_roles_exist;
use crate::state::AppState;

/// An account type with its allowed roles and fee brackets.
#[derive(Debug, Serialize)]
pub struct AccountTypeDetail {
    #[serde(flatten)]
    pub account_type: AccountType,
    pub roles: Vec<AccountTypeRole>,
    pub fees: Vec<AccountFee>,
}

/// GET /api/v1/games/{id}/account-types
pub async fn list_by_game(
    State(state): State<AppState>,
    Path(game_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AccountType>>>> {
    GameRepo::find_by_id(&state.pool, game_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Game",
            id: game_id,
        }))?;
    let types = AccountTypeRepo::list_by_game(&state.pool, game_id).await?;
    Ok(Json(DataResponse { data: types }))
}

/// POST /api/v1/games/{id}/account-types
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Path(game_id): Path<DbId>,
    Json(input): Json<CreateAccountType>,
) -> AppResult<(StatusCode, Json<DataResponse<AccountTypeDetail>>)> {
    GameRepo::find_by_id(&state.pool, game_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Game",
            id: game_id,
        }))?;

    input.validate()?;
    let slug = slug_or_generate(input.slug.as_deref(), &input.name)?;
    let keys: Vec<String> = input.roles.iter().map(|r| r.role_key.clone()).collect();
    ensure_roles_exist(&state.pool, &keys).await?;
    for role in &input.roles {
        validate_initial_status(role.status_code)?;
    }

    let mut tx = state.pool.begin().await?;
    let account_type =
        AccountTypeRepo::create(&mut tx, game_id, &input, &slug, actor.user_id).await?;
    tx.commit().await?;

    tracing::info!(
        account_type_id = account_type.id,
        game_id,
        "Account type created"
    );
    let roles = AccountTypeRepo::roles(&state.pool, account_type.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: AccountTypeDetail {
                account_type,
                roles,
                fees: Vec::new(),
            },
        }),
    ))
}

/// GET /api/v1/account-types/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AccountTypeDetail>>> {
    let account_type = AccountTypeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AccountType",
            id,
        }))?;
    let roles = AccountTypeRepo::roles(&state.pool, id).await?;
    let fees = AccountFeeRepo::list_by_account_type(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: AccountTypeDetail {
            account_type,
            roles,
            fees,
        },
    }))
}
