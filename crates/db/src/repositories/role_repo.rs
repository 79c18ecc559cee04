//! Repository for the `roles` table and the user role pivot.

use market_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::Role;

const COLUMNS: &str = "key, name, description, created_at, updated_at";

/// Read access to roles. Roles are seeded by migrations.
pub struct RoleRepo;

impl RoleRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles ORDER BY key");
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }

    pub async fn find_by_key(pool: &PgPool, key: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE key = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Role keys the given user may act under.
    pub async fn keys_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT role_key FROM user_roles WHERE user_id = $1 ORDER BY role_key")
                .bind(user_id)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(k,)| k).collect())
    }

    /// Of `keys`, those that do not exist in the `roles` table.
    pub async fn unknown_keys(pool: &PgPool, keys: &[String]) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT k FROM UNNEST($1::text[]) AS k
             WHERE NOT EXISTS (SELECT 1 FROM roles r WHERE r.key = k)
             ORDER BY k",
        )
        .bind(keys)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(k,)| k).collect())
    }
}
