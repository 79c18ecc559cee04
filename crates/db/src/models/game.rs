//! Game entity model and DTOs.

use market_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A game row from the `games` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Game {
    pub id: DbId,
    pub order: Option<i32>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub publisher_name: String,
    pub image_path: Option<String>,
    pub creator_id: Option<DbId>,
    pub latest_updater_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a game. The image path is filled in by the upload step.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGame {
    pub order: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Derived from `name` when omitted.
    pub slug: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub publisher_name: String,
    /// Roles allowed to list accounts for this game.
    #[serde(default)]
    pub role_keys: Vec<String>,
}

/// DTO for updating a game. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateGame {
    pub order: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub slug: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub publisher_name: Option<String>,
    /// Replaces the role set when present.
    pub role_keys: Option<Vec<String>>,
}
