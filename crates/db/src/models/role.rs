//! Role entity model.

use market_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A role row from the `roles` table. Keyed by its stable string key.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
