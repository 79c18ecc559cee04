//! Field definitions: account infos, account actions and game infos.
//!
//! The three share one shape. Account infos and account actions belong to an
//! account type, game infos to a game; `owner_id` is whichever applies.

use market_core::rules::Rule;
use market_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::rule::CreateRule;

/// A row from `account_infos`, `account_actions` or `game_infos`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FieldDefinition {
    pub id: DbId,
    pub owner_id: DbId,
    pub rule_id: DbId,
    pub order: Option<i32>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Tutorial video for account actions; always `None` elsewhere.
    pub video_path: Option<String>,
    pub creator_id: Option<DbId>,
    pub latest_updater_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A definition together with its rule.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDefinitionWithRule {
    #[serde(flatten)]
    pub definition: FieldDefinition,
    pub rule: Rule,
}

/// DTO for creating a definition with an inline rule.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFieldDefinition {
    pub order: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub slug: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub video_path: Option<String>,
    pub rule: CreateRule,
}

/// DTO for updating a definition. A present `rule` replaces the stored rule.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateFieldDefinition {
    pub order: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub video_path: Option<String>,
    pub rule: Option<CreateRule>,
}
