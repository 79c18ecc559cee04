//! Handlers for field definitions: game infos, account infos and account
//! actions.
//!
//! The three resources share one implementation selected by [`Scope`];
//! the public handlers only bind the scope and the owner lookup.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use market_core::error::CoreError;
use market_core::slug::{slug_or_generate, updated_slug};
use market_core::submission::Scope;
use market_core::types::DbId;
use market_db::models::field_definition::{
    CreateFieldDefinition, FieldDefinition, FieldDefinitionWithRule, UpdateFieldDefinition,
};
use market_db::repositories::{AccountTypeRepo, FieldDefinitionRepo, GameRepo, RuleRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::rule::check_rule;
use crate::middleware::actor::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

fn entity(scope: Scope) -> &'static str {
    match scope {
        Scope::AccountInfos => "AccountInfo",
        Scope::AccountActions => "AccountAction",
        Scope::GameInfos => "GameInfo",
    }
}

fn not_found(scope: Scope, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: entity(scope),
        id,
    })
}

/// 404 unless the owner (game or account type) of `scope` exists.
async fn ensure_owner(state: &AppState, scope: Scope, owner_id: DbId) -> AppResult<()> {
    let exists = match scope {
        Scope::GameInfos => GameRepo::find_by_id(&state.pool, owner_id).await?.is_some(),
        Scope::AccountInfos | Scope::AccountActions => {
            AccountTypeRepo::find_by_id(&state.pool, owner_id)
                .await?
                .is_some()
        }
    };
    if exists {
        Ok(())
    } else {
        let entity = if scope == Scope::GameInfos {
            "Game"
        } else {
            "AccountType"
        };
        Err(AppError::Core(CoreError::NotFound {
            entity,
            id: owner_id,
        }))
    }
}

async fn list_scoped(
    state: &AppState,
    scope: Scope,
    owner_id: DbId,
) -> AppResult<Json<DataResponse<Vec<FieldDefinitionWithRule>>>> {
    ensure_owner(state, scope, owner_id).await?;
    let definitions = FieldDefinitionRepo::list_with_rules(&state.pool, scope, owner_id).await?;
    Ok(Json(DataResponse { data: definitions }))
}

/// Create the rule and the definition pointing at it in one transaction.
async fn create_scoped(
    state: &AppState,
    actor: &Actor,
    scope: Scope,
    owner_id: DbId,
    input: CreateFieldDefinition,
) -> AppResult<(StatusCode, Json<DataResponse<FieldDefinitionWithRule>>)> {
    ensure_owner(state, scope, owner_id).await?;
    input.validate()?;
    let slug = slug_or_generate(input.slug.as_deref(), &input.name)?;
    check_rule(&state.pool, &input.rule).await?;

    let mut tx = state.pool.begin().await?;
    let rule = RuleRepo::create(&mut tx, &input.rule).await?;
    let definition = FieldDefinitionRepo::create(
        &mut tx,
        scope,
        owner_id,
        rule.rule.id,
        &input,
        &slug,
        actor.user_id,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        scope = %scope,
        owner_id,
        definition_id = definition.id,
        rule_id = rule.rule.id,
        "Field definition created"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: FieldDefinitionWithRule {
                definition,
                rule: rule.rule,
            },
        }),
    ))
}

async fn delete_scoped(state: &AppState, scope: Scope, id: DbId) -> AppResult<StatusCode> {
    if FieldDefinitionRepo::soft_delete(&state.pool, scope, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(scope, id))
    }
}

// ---------------------------------------------------------------------------
// Game infos
// ---------------------------------------------------------------------------

/// GET /api/v1/games/{id}/game-infos
pub async fn list_game_infos(
    State(state): State<AppState>,
    Path(game_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<FieldDefinitionWithRule>>>> {
    list_scoped(&state, Scope::GameInfos, game_id).await
}

/// POST /api/v1/games/{id}/game-infos
pub async fn create_game_info(
    State(state): State<AppState>,
    actor: Actor,
    Path(game_id): Path<DbId>,
    Json(input): Json<CreateFieldDefinition>,
) -> AppResult<(StatusCode, Json<DataResponse<FieldDefinitionWithRule>>)> {
    create_scoped(&state, &actor, Scope::GameInfos, game_id, input).await
}

/// DELETE /api/v1/game-infos/{id}
pub async fn delete_game_info(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    delete_scoped(&state, Scope::GameInfos, id).await
}

// ---------------------------------------------------------------------------
// Account infos
// ---------------------------------------------------------------------------

/// GET /api/v1/account-types/{id}/account-infos
pub async fn list_account_infos(
    State(state): State<AppState>,
    Path(account_type_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<FieldDefinitionWithRule>>>> {
    list_scoped(&state, Scope::AccountInfos, account_type_id).await
}

/// POST /api/v1/account-types/{id}/account-infos
pub async fn create_account_info(
    State(state): State<AppState>,
    actor: Actor,
    Path(account_type_id): Path<DbId>,
    Json(input): Json<CreateFieldDefinition>,
) -> AppResult<(StatusCode, Json<DataResponse<FieldDefinitionWithRule>>)> {
    create_scoped(&state, &actor, Scope::AccountInfos, account_type_id, input).await
}

/// DELETE /api/v1/account-infos/{id}
pub async fn delete_account_info(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    delete_scoped(&state, Scope::AccountInfos, id).await
}

// ---------------------------------------------------------------------------
// Account actions
// ---------------------------------------------------------------------------

/// GET /api/v1/account-types/{id}/account-actions
pub async fn list_account_actions(
    State(state): State<AppState>,
    Path(account_type_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<FieldDefinitionWithRule>>>> {
    list_scoped(&state, Scope::AccountActions, account_type_id).await
}

/// POST /api/v1/account-types/{id}/account-actions
pub async fn create_account_action(
    State(state): State<AppState>,
    actor: Actor,
    Path(account_type_id): Path<DbId>,
    Json(input): Json<CreateFieldDefinition>,
) -> AppResult<(StatusCode, Json<DataResponse<FieldDefinitionWithRule>>)> {
    create_scoped(&state, &actor, Scope::AccountActions, account_type_id, input).await
}

/// GET /api/v1/account-actions/{id}
pub async fn get_account_action(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FieldDefinitionWithRule>>> {
    let scope = Scope::AccountActions;
    let definition = FieldDefinitionRepo::find_by_id(&state.pool, scope, id)
        .await?
        .ok_or_else(|| not_found(scope, id))?;
    let rule = RuleRepo::find_by_id(&state.pool, definition.rule_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Rule",
            id: definition.rule_id,
        }))?;
    Ok(Json(DataResponse {
        data: FieldDefinitionWithRule {
            definition,
            rule: rule.rule,
        },
    }))
}

/// PUT /api/v1/account-actions/{id}
///
/// A `rule` in the body replaces the action's rule in the same transaction.
pub async fn update_account_action(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateFieldDefinition>,
) -> AppResult<Json<DataResponse<FieldDefinition>>> {
    let scope = Scope::AccountActions;
    let current = FieldDefinitionRepo::find_by_id(&state.pool, scope, id)
        .await?
        .ok_or_else(|| not_found(scope, id))?;

    input.validate()?;
    let slug = updated_slug(None, input.name.as_deref())?;
    if let Some(rule) = &input.rule {
        check_rule(&state.pool, rule).await?;
    }

    let mut tx = state.pool.begin().await?;
    if let Some(rule) = &input.rule {
        RuleRepo::replace(&mut tx, current.rule_id, rule).await?;
    }
    let definition = FieldDefinitionRepo::update(
        &mut tx,
        scope,
        id,
        &input,
        slug.as_deref(),
        actor.user_id,
    )
    .await?
    .ok_or_else(|| not_found(scope, id))?;
    tx.commit().await?;

    Ok(Json(DataResponse { data: definition }))
}

/// DELETE /api/v1/account-actions/{id}
pub async fn delete_account_action(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    delete_scoped(&state, Scope::AccountActions, id).await
}
