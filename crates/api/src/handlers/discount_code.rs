//! Handlers for the `/discount-codes` resource and code purchases.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use market_core::error::CoreError;
use market_core::pagination::{clamp_limit, clamp_offset};
use market_core::types::DbId;
use market_db::models::discount_code::{
    CreateDiscountCode, DiscountCode, SupportedGame, UpdateDiscountCode,
};
use market_db::repositories::{DiscountCodeRepo, GameRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::actor::Actor;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::services::discount_codes::{self, find_code, DiscountPurchase};
use crate::state::AppState;

/// A discount code with the games it applies to and who bought it.
#[derive(Debug, Serialize)]
pub struct DiscountCodeDetail {
    #[serde(flatten)]
    pub discount_code: DiscountCode,
    pub supported_games: Vec<SupportedGame>,
    pub buyer_ids: Vec<DbId>,
}

/// Body of `POST /games/{id}/discount-codes/{code}`.
#[derive(Debug, Default, Deserialize)]
pub struct SupportGameRequest {
    #[serde(default)]
    pub type_code: i32,
}

fn key_not_found(code: &str) -> AppError {
    AppError::Core(CoreError::KeyNotFound {
        entity: "DiscountCode",
        key: code.to_string(),
    })
}

/// GET /api/v1/discount-codes
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<DiscountCode>>>> {
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);
    let codes = DiscountCodeRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: codes }))
}

/// POST /api/v1/discount-codes
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(input): Json<CreateDiscountCode>,
) -> AppResult<(StatusCode, Json<DataResponse<DiscountCode>>)> {
    input.validate()?;
    let code = DiscountCodeRepo::create(&state.pool, &input, actor.user_id).await?;
    tracing::info!(discount_code = %code.discount_code, "Discount code created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: code })))
}

/// GET /api/v1/discount-codes/{code}
pub async fn get_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<DataResponse<DiscountCodeDetail>>> {
    let discount_code = find_code(&state.pool, &code).await?;
    let supported_games = DiscountCodeRepo::supported_games(&state.pool, &code).await?;
    let buyer_ids = DiscountCodeRepo::buyer_ids(&state.pool, &code).await?;
    Ok(Json(DataResponse {
        data: DiscountCodeDetail {
            discount_code,
            supported_games,
            buyer_ids,
        },
    }))
}

/// PUT /api/v1/discount-codes/{code}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(code): Path<String>,
    Json(input): Json<UpdateDiscountCode>,
) -> AppResult<Json<DataResponse<DiscountCode>>> {
    input.validate()?;
    let updated = DiscountCodeRepo::update(&state.pool, &code, &input, actor.user_id)
        .await?
        .ok_or_else(|| key_not_found(&code))?;
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/discount-codes/{code}
pub async fn delete(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<StatusCode> {
    if DiscountCodeRepo::delete(&state.pool, &code).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(key_not_found(&code))
    }
}

/// POST /api/v1/discount-codes/{code}/buy
pub async fn buy(
    State(state): State<AppState>,
    actor: Actor,
    Path(code): Path<String>,
) -> AppResult<Json<DataResponse<DiscountPurchase>>> {
    let purchase = discount_codes::buy(&state.pool, &actor, &code).await?;
    Ok(Json(DataResponse { data: purchase }))
}

/// POST /api/v1/games/{id}/discount-codes/{code}
///
/// Attach a game to a code; repeating the call updates the type code.
pub async fn support_game(
    State(state): State<AppState>,
    Path((game_id, code)): Path<(DbId, String)>,
    Json(input): Json<SupportGameRequest>,
) -> AppResult<Json<DataResponse<SupportedGame>>> {
    GameRepo::find_by_id(&state.pool, game_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Game",
            id: game_id,
        }))?;
    let discount = find_code(&state.pool, &code).await?;
    let supported =
        DiscountCodeRepo::support_game(&state.pool, &discount.discount_code, game_id, input.type_code)
            .await?;
    Ok(Json(DataResponse { data: supported }))
}
