//! Account entity model, pivots and DTOs.

use market_core::types::{DbId, Timestamp};
use serde::Serialize;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `accounts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Account {
    pub id: DbId,
    pub account_type_id: DbId,
    pub username: String,
    /// Credentials of the game account; never serialized.
    #[serde(skip_serializing)]
    pub password: String,
    pub cost: i64,
    pub description: Option<String>,
    pub status_code: i32,
    pub last_role_key_editor_used: String,
    pub representative_image_path: Option<String>,
    pub buyer_id: Option<DbId>,
    pub sold_at_price: Option<i64>,
    pub sold_at: Option<Timestamp>,
    pub approved_at: Option<Timestamp>,
    pub creator_id: Option<DbId>,
    pub latest_updater_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A gallery image of an account.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AccountImage {
    pub id: DbId,
    pub account_id: DbId,
    pub path: String,
    pub created_at: Timestamp,
}

/// A stored value of an account info or game info field.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FieldValue {
    pub field_id: DbId,
    pub value: Json<Value>,
}

/// Completion state of an account action.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActionState {
    pub field_id: DbId,
    pub is_done: bool,
}

/// Values for a new account row.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub account_type_id: DbId,
    pub username: String,
    pub password: String,
    pub cost: i64,
    pub description: Option<String>,
    pub status_code: i32,
    pub role_key: String,
    pub representative_image_path: Option<String>,
    pub creator_id: DbId,
}

/// Column changes for an account update. `None` keeps the stored value.
#[derive(Debug, Clone)]
pub struct AccountChanges {
    pub username: Option<String>,
    pub password: Option<String>,
    pub cost: Option<i64>,
    pub description: Option<String>,
    pub role_key: String,
    pub representative_image_path: Option<String>,
    pub updater_id: DbId,
}
