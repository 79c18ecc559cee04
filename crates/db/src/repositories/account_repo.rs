//! Repository for `accounts`, its field-value pivots and gallery images.

use std::collections::BTreeMap;

use market_core::types::DbId;
use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use sqlx::types::Json;

use crate::models::account::{
    Account, AccountChanges, AccountImage, ActionState, FieldValue, NewAccount,
};

const COLUMNS: &str = "id, account_type_id, username, password, cost, description, status_code, \
                       last_role_key_editor_used, representative_image_path, buyer_id, \
                       sold_at_price, sold_at, approved_at, creator_id, latest_updater_id, \
                       created_at, updated_at";

/// Filter shared by `list` and `count`: username/description substring, or
/// exact id/cost when the search term is numeric; optionally one creator.
const SEARCH_FILTER: &str = "deleted_at IS NULL
    AND ($2::bigint IS NULL OR creator_id = $2)
    AND (
        $1::text IS NULL
        OR username ILIKE '%' || $1 || '%'
        OR description ILIKE '%' || $1 || '%'
        OR (id::text = $1)
        OR (cost::text = $1)
    )";

/// Search criteria for account listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountSearch<'a> {
    pub term: Option<&'a str>,
    /// Restrict to accounts created by this user.
    pub creator_id: Option<DbId>,
}

pub struct AccountRepo;

impl AccountRepo {
    pub async fn create(conn: &mut PgConnection, input: &NewAccount) -> Result<Account, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts
                (account_type_id, username, password, cost, description, status_code,
                 last_role_key_editor_used, representative_image_path, creator_id, latest_updater_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(input.account_type_id)
            .bind(&input.username)
            .bind(&input.password)
            .bind(input.cost)
            .bind(&input.description)
            .bind(input.status_code)
            .bind(&input.role_key)
            .bind(&input.representative_image_path)
            .bind(input.creator_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find an account by id. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Page of accounts, newest first.
    pub async fn list(
        pool: &PgPool,
        search: AccountSearch<'_>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Account>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM accounts WHERE {SEARCH_FILTER}
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(search.term)
            .bind(search.creator_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, search: AccountSearch<'_>) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM accounts WHERE {SEARCH_FILTER}");
        let (count,): (i64,) = sqlx::query_as(&query)
            .bind(search.term)
            .bind(search.creator_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Apply `changes`. Returns `None` if no live account with `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        changes: &AccountChanges,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET
                username = COALESCE($2, username),
                password = COALESCE($3, password),
                cost = COALESCE($4, cost),
                description = COALESCE($5, description),
                last_role_key_editor_used = $6,
                representative_image_path = COALESCE($7, representative_image_path),
                latest_updater_id = $8
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(&changes.username)
            .bind(&changes.password)
            .bind(changes.cost)
            .bind(&changes.description)
            .bind(&changes.role_key)
            .bind(&changes.representative_image_path)
            .bind(changes.updater_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Move an account from `from_status` to `to_status` and stamp
    /// `approved_at`. Returns `None` if the account is not in `from_status`.
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
        from_status: i32,
        to_status: i32,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET status_code = $3, approved_at = NOW()
             WHERE id = $1 AND status_code = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(from_status)
            .bind(to_status)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Pivots
    // -----------------------------------------------------------------------

    /// Make the account's info values exactly `values`.
    pub async fn sync_account_infos(
        conn: &mut PgConnection,
        account_id: DbId,
        values: &BTreeMap<DbId, Value>,
    ) -> Result<(), sqlx::Error> {
        sync_json_pivot(conn, "account_account_infos", "account_info_id", account_id, values).await
    }

    /// Make the account's game info values exactly `values`.
    pub async fn sync_game_infos(
        conn: &mut PgConnection,
        account_id: DbId,
        values: &BTreeMap<DbId, Value>,
    ) -> Result<(), sqlx::Error> {
        sync_json_pivot(conn, "account_game_infos", "game_info_id", account_id, values).await
    }

    /// Make the account's action states exactly `states`.
    pub async fn sync_account_actions(
        conn: &mut PgConnection,
        account_id: DbId,
        states: &BTreeMap<DbId, bool>,
    ) -> Result<(), sqlx::Error> {
        let ids: Vec<DbId> = states.keys().copied().collect();
        sqlx::query(
            "DELETE FROM account_account_actions
             WHERE account_id = $1 AND NOT (account_action_id = ANY($2))",
        )
        .bind(account_id)
        .bind(&ids)
        .execute(&mut *conn)
        .await?;

        for (action_id, is_done) in states {
            sqlx::query(
                "INSERT INTO account_account_actions (account_id, account_action_id, is_done)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (account_id, account_action_id) DO UPDATE SET is_done = EXCLUDED.is_done",
            )
            .bind(account_id)
            .bind(action_id)
            .bind(is_done)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    pub async fn account_info_values(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Vec<FieldValue>, sqlx::Error> {
        sqlx::query_as::<_, FieldValue>(
            "SELECT account_info_id AS field_id, value FROM account_account_infos
             WHERE account_id = $1 ORDER BY account_info_id",
        )
        .bind(account_id)
        .fetch_all(pool)
        .await
    }

    pub async fn game_info_values(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Vec<FieldValue>, sqlx::Error> {
        sqlx::query_as::<_, FieldValue>(
            "SELECT game_info_id AS field_id, value FROM account_game_infos
             WHERE account_id = $1 ORDER BY game_info_id",
        )
        .bind(account_id)
        .fetch_all(pool)
        .await
    }

    pub async fn action_states(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Vec<ActionState>, sqlx::Error> {
        sqlx::query_as::<_, ActionState>(
            "SELECT account_action_id AS field_id, is_done FROM account_account_actions
             WHERE account_id = $1 ORDER BY account_action_id",
        )
        .bind(account_id)
        .fetch_all(pool)
        .await
    }
}

async fn sync_json_pivot(
    conn: &mut PgConnection,
    table: &str,
    field_column: &str,
    account_id: DbId,
    values: &BTreeMap<DbId, Value>,
) -> Result<(), sqlx::Error> {
    let ids: Vec<DbId> = values.keys().copied().collect();
    let delete = format!(
        "DELETE FROM {table} WHERE account_id = $1 AND NOT ({field_column} = ANY($2))"
    );
    sqlx::query(&delete)
        .bind(account_id)
        .bind(&ids)
        .execute(&mut *conn)
        .await?;

    let upsert = format!(
        "INSERT INTO {table} (account_id, {field_column}, value) VALUES ($1, $2, $3)
         ON CONFLICT (account_id, {field_column}) DO UPDATE SET value = EXCLUDED.value"
    );
    for (field_id, value) in values {
        sqlx::query(&upsert)
            .bind(account_id)
            .bind(field_id)
            .bind(Json(value))
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Gallery images of accounts.
pub struct AccountImageRepo;

impl AccountImageRepo {
    pub async fn create(
        conn: &mut PgConnection,
        account_id: DbId,
        path: &str,
    ) -> Result<AccountImage, sqlx::Error> {
        sqlx::query_as::<_, AccountImage>(
            "INSERT INTO account_images (account_id, path) VALUES ($1, $2)
             RETURNING id, account_id, path, created_at",
        )
        .bind(account_id)
        .bind(path)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn list_by_account(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Vec<AccountImage>, sqlx::Error> {
        sqlx::query_as::<_, AccountImage>(
            "SELECT id, account_id, path, created_at FROM account_images
             WHERE account_id = $1 ORDER BY id",
        )
        .bind(account_id)
        .fetch_all(pool)
        .await
    }
}
