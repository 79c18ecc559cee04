//! Handlers for the `/rules` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use market_core::error::CoreError;
use market_core::roles::resolve_role;
use market_core::rules::{generate_rule, validate_rule_definition, RuleEvaluation};
use market_core::types::DbId;
use market_db::models::rule::{CreateRule, RuleRecord};
use market_db::repositories::{RoleRepo, RuleRepo};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::query::RoleKeyParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Check a rule definition and its required role keys before storing it.
pub async fn check_rule(pool: &PgPool, input: &CreateRule) -> AppResult<()> {
    validate_rule_definition(&input.to_rule())?;
    let keys: Vec<String> = input.required_role_keys.iter().cloned().collect();
    let unknown = RoleRepo::unknown_keys(pool, &keys).await?;
    if !unknown.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Unknown required role keys: {}",
            unknown.join(", ")
        )));
    }
    Ok(())
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Rule", id })
}

/// GET /api/v1/rules
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<RuleRecord>>>> {
    let rules = RuleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: rules }))
}

/// POST /api/v1/rules
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateRule>,
) -> AppResult<(StatusCode, Json<DataResponse<RuleRecord>>)> {
    check_rule(&state.pool, &input).await?;
    let mut tx = state.pool.begin().await?;
    let rule = RuleRepo::create(&mut tx, &input).await?;
    tx.commit().await?;
    tracing::info!(rule_id = rule.rule.id, rule_type = %rule.rule.rule_type, "Rule created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: rule })))
}

/// GET /api/v1/rules/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<RuleRecord>>> {
    let rule = RuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: rule }))
}

/// PUT /api/v1/rules/{id}
///
/// Replaces the whole rule, required roles included.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateRule>,
) -> AppResult<Json<DataResponse<RuleRecord>>> {
    check_rule(&state.pool, &input).await?;
    let mut tx = state.pool.begin().await?;
    let rule = RuleRepo::replace(&mut tx, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tx.commit().await?;
    Ok(Json(DataResponse { data: rule }))
}

/// DELETE /api/v1/rules/{id}
///
/// Returns 409 while any field definition still uses the rule.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if RuleRepo::is_referenced(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Rule {id} is still used by a field definition"
        ))));
    }
    if RuleRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// GET /api/v1/rules/{id}/generate?role_key=
///
/// Preview the validation specification the rule produces for a role.
pub async fn generate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<RoleKeyParams>,
) -> AppResult<Json<DataResponse<RuleEvaluation>>> {
    let record = RuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let roles = RoleRepo::list(&state.pool).await?;
    let role = resolve_role(&params.role_key, roles.iter().map(|r| r.key.as_str()))?;
    let evaluation = generate_rule(&record.rule, &role);
    Ok(Json(DataResponse { data: evaluation }))
}
