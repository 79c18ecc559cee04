//! Handlers for the `/accounts` resource.
//!
//! Create and update take a multipart form: the JSON submission in
//! `payload`, an optional `representativeImage` and any number of `images`.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use market_core::account_status::{self, STATUS_PENDING};
use market_core::error::CoreError;
use market_core::pagination::{clamp_limit, clamp_offset};
use market_core::roles::ROLE_ADMIN;
use market_core::types::DbId;
use market_db::models::account::Account;
use market_db::repositories::{AccountRepo, AccountSearch};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::form::UploadForm;
use crate::middleware::actor::Actor;
use crate::query::SearchParams;
use crate::response::{DataResponse, PageResponse};
use crate::services::accounts::{
    self, AccountDetail, AccountImages, AccountResource, AccountSubmission,
};
use crate::services::discount_codes::{self, PriceQuote};
use crate::state::AppState;

pub const REPRESENTATIVE_IMAGE_FIELD: &str = "representativeImage";
pub const GALLERY_FIELD: &str = "images";

/// `?discount_code=` for the price quote.
#[derive(Debug, Deserialize)]
pub struct PriceParams {
    pub discount_code: Option<String>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Account",
        id,
    })
}

async fn find(state: &AppState, id: DbId) -> AppResult<Account> {
    AccountRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

async fn read_submission(multipart: Multipart) -> AppResult<(AccountSubmission, AccountImages)> {
    let mut form = UploadForm::read(multipart).await?;
    let input: AccountSubmission = form.payload()?;
    let images = AccountImages {
        representative: form.take_file(REPRESENTATIVE_IMAGE_FIELD),
        gallery: form.take_files(GALLERY_FIELD),
    };
    Ok((input, images))
}

async fn search_page(
    state: &AppState,
    params: &SearchParams,
    creator_id: Option<DbId>,
) -> AppResult<PageResponse<AccountResource>> {
    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);
    let search = AccountSearch {
        term: params.search.as_deref().filter(|s| !s.trim().is_empty()),
        creator_id,
    };

    let accounts = AccountRepo::list(&state.pool, search, limit, offset).await?;
    let total = AccountRepo::count(&state.pool, search).await?;
    let data = accounts::with_prices(&state.pool, accounts).await?;
    Ok(PageResponse {
        data,
        total,
        limit,
        offset,
    })
}

/// GET /api/v1/accounts
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<PageResponse<AccountResource>>> {
    Ok(Json(search_page(&state, &params, None).await?))
}

/// GET /api/v1/accounts/manage
///
/// Accounts the actor created. Admins see every account.
pub async fn manage(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<PageResponse<AccountResource>>> {
    let creator_id = if actor.role_keys.iter().any(|r| r == ROLE_ADMIN) {
        None
    } else {
        Some(actor.user_id)
    };
    Ok(Json(search_page(&state, &params, creator_id).await?))
}

/// POST /api/v1/account-types/{id}/accounts
pub async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Path(account_type_id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<AccountDetail>>)> {
    let (input, images) = read_submission(multipart).await?;
    let account = accounts::create_account(
        &state.pool,
        state.files.as_ref(),
        &actor,
        account_type_id,
        input,
        images,
    )
    .await?;
    let detail = accounts::load_detail(&state.pool, account).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /api/v1/accounts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AccountDetail>>> {
    let account = find(&state, id).await?;
    let detail = accounts::load_detail(&state.pool, account).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/accounts/{id}
pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<AccountDetail>>> {
    let (input, images) = read_submission(multipart).await?;
    let account =
        accounts::update_account(&state.pool, state.files.as_ref(), &actor, id, input, images)
            .await?;
    let detail = accounts::load_detail(&state.pool, account).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /api/v1/accounts/{id}/approve
///
/// Returns 409 unless the account is pending.
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Account>>> {
    let account = find(&state, id).await?;
    let next = account_status::approve(account.status_code)?;

    // The conditional update loses to a concurrent approval.
    let approved = AccountRepo::approve(&state.pool, id, STATUS_PENDING, next)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Account {id} is no longer pending"
            )))
        })?;

    tracing::info!(account_id = id, status_code = next, "Account approved");
    Ok(Json(DataResponse { data: approved }))
}

/// GET /api/v1/accounts/{id}/price?discount_code=
pub async fn price(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PriceParams>,
) -> AppResult<Json<DataResponse<PriceQuote>>> {
    let quote = discount_codes::quote(&state.pool, id, params.discount_code.as_deref()).await?;
    Ok(Json(DataResponse { data: quote }))
}
