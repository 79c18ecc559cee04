//! Account type entity model and DTOs.

use market_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `account_types` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AccountType {
    pub id: DbId,
    pub game_id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub creator_id: Option<DbId>,
    pub latest_updater_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A role allowed to use an account type, with the status new accounts get.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AccountTypeRole {
    pub role_key: String,
    pub status_code: i32,
}

/// DTO for creating an account type under a game.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAccountType {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub slug: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[serde(default)]
    pub roles: Vec<AccountTypeRole>,
}
