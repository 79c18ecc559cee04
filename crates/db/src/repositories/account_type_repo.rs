//! Repository for the `account_types` table and its role pivot.

use market_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::account_type::{AccountType, AccountTypeRole, CreateAccountType};

const COLUMNS: &str =
    "id, game_id, name, slug, description, creator_id, latest_updater_id, created_at, updated_at";

pub struct AccountTypeRepo;

impl AccountTypeRepo {
    /// Insert an account type and the roles allowed to use it.
    pub async fn create(
        conn: &mut PgConnection,
        game_id: DbId,
        input: &CreateAccountType,
        slug: &str,
        creator_id: DbId,
    ) -> Result<AccountType, sqlx::Error> {
        let query = format!(
            "INSERT INTO account_types (game_id, name, slug, description, creator_id, latest_updater_id)
             VALUES ($1, $2, $3, $4, $5, $5)
             RETURNING {COLUMNS}"
        );
        let account_type = sqlx::query_as::<_, AccountType>(&query)
            .bind(game_id)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description)
            .bind(creator_id)
            .fetch_one(&mut *conn)
            .await?;

        for role in &input.roles {
            sqlx::query(
                "INSERT INTO account_type_roles (account_type_id, role_key, status_code)
                 VALUES ($1, $2, $3)",
            )
            .bind(account_type.id)
            .bind(&role.role_key)
            .bind(role.status_code)
            .execute(&mut *conn)
            .await?;
        }
        Ok(account_type)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AccountType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM account_types WHERE id = $1");
        sqlx::query_as::<_, AccountType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_game(
        pool: &PgPool,
        game_id: DbId,
    ) -> Result<Vec<AccountType>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM account_types WHERE game_id = $1 ORDER BY name");
        sqlx::query_as::<_, AccountType>(&query)
            .bind(game_id)
            .fetch_all(pool)
            .await
    }

    pub async fn roles(
        pool: &PgPool,
        account_type_id: DbId,
    ) -> Result<Vec<AccountTypeRole>, sqlx::Error> {
        sqlx::query_as::<_, AccountTypeRole>(
            "SELECT role_key, status_code FROM account_type_roles
             WHERE account_type_id = $1 ORDER BY role_key",
        )
        .bind(account_type_id)
        .fetch_all(pool)
        .await
    }

    /// Status code a new account gets when created under `role_key`, or
    /// `None` if the role may not use the account type.
    pub async fn status_for_role(
        pool: &PgPool,
        account_type_id: DbId,
        role_key: &str,
    ) -> Result<Option<i32>, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT status_code FROM account_type_roles
             WHERE account_type_id = $1 AND role_key = $2",
        )
        .bind(account_type_id)
        .bind(role_key)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(code,)| code))
    }
}
