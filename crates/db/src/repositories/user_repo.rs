//! Repository for the `users` table.

use market_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::user::{CreateUser, User};

const COLUMNS: &str = "id, name, email, gold_coin, silver_coin, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    /// Insert a user and their role assignments in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO users (name, email, silver_coin)
             VALUES ($1, $2, COALESCE($3, 0))
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.silver_coin)
            .fetch_one(&mut *tx)
            .await?;

        for key in &input.role_keys {
            sqlx::query("INSERT INTO user_roles (user_id, role_key) VALUES ($1, $2)")
                .bind(user.id)
                .bind(key)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock a user row for the rest of the transaction.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn set_silver_coin(
        conn: &mut PgConnection,
        id: DbId,
        silver_coin: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET silver_coin = $2 WHERE id = $1")
            .bind(id)
            .bind(silver_coin)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
