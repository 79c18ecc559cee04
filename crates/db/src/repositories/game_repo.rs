//! Repository for the `games` table and its role pivot.

use market_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::game::{CreateGame, Game, UpdateGame};

const COLUMNS: &str = "id, \"order\", name, slug, description, publisher_name, image_path, \
                       creator_id, latest_updater_id, created_at, updated_at";

pub struct GameRepo;

impl GameRepo {
    /// Insert a game and its allowed roles.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateGame,
        slug: &str,
        image_path: Option<&str>,
        creator_id: DbId,
    ) -> Result<Game, sqlx::Error> {
        let query = format!(
            "INSERT INTO games (\"order\", name, slug, description, publisher_name, image_path,
                                creator_id, latest_updater_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
             RETURNING {COLUMNS}"
        );
        let game = sqlx::query_as::<_, Game>(&query)
            .bind(input.order)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description)
            .bind(&input.publisher_name)
            .bind(image_path)
            .bind(creator_id)
            .fetch_one(&mut *conn)
            .await?;

        Self::set_roles(conn, game.id, &input.role_keys).await?;
        Ok(game)
    }

    /// Find a game by id. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Game>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM games WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Game>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List games by display order, then name. Excludes soft-deleted rows.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Game>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM games WHERE deleted_at IS NULL
             ORDER BY \"order\" NULLS LAST, name
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Game>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Live games with at least one account type open to any of
    /// `role_keys`, in the same order as [`GameRepo::list`].
    pub async fn list_usable(pool: &PgPool, role_keys: &[String]) -> Result<Vec<Game>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM games g
             WHERE g.deleted_at IS NULL
               AND EXISTS (
                   SELECT 1 FROM account_types t
                   JOIN account_type_roles r ON r.account_type_id = t.id
                   WHERE t.game_id = g.id AND r.role_key = ANY($1)
               )
             ORDER BY g.\"order\" NULLS LAST, g.name"
        );
        sqlx::query_as::<_, Game>(&query)
            .bind(role_keys)
            .fetch_all(pool)
            .await
    }

    /// Update a game. Only non-`None` fields are applied; `image_path`
    /// replaces the stored path when given.
    ///
    /// Returns `None` if no live game with the given `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateGame,
        slug: Option<&str>,
        image_path: Option<&str>,
        updater_id: DbId,
    ) -> Result<Option<Game>, sqlx::Error> {
        let query = format!(
            "UPDATE games SET
                \"order\" = COALESCE($2, \"order\"),
                name = COALESCE($3, name),
                slug = COALESCE($4, slug),
                description = COALESCE($5, description),
                publisher_name = COALESCE($6, publisher_name),
                image_path = COALESCE($7, image_path),
                latest_updater_id = $8
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        let game = sqlx::query_as::<_, Game>(&query)
            .bind(id)
            .bind(input.order)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description)
            .bind(&input.publisher_name)
            .bind(image_path)
            .bind(updater_id)
            .fetch_optional(&mut *conn)
            .await?;

        if let (Some(game), Some(keys)) = (&game, &input.role_keys) {
            Self::set_roles(conn, game.id, keys).await?;
        }
        Ok(game)
    }

    /// Soft-delete a game. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE games SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn role_keys(pool: &PgPool, game_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT role_key FROM game_roles WHERE game_id = $1 ORDER BY role_key")
                .bind(game_id)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(k,)| k).collect())
    }

    async fn set_roles(
        conn: &mut PgConnection,
        game_id: DbId,
        role_keys: &[String],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM game_roles WHERE game_id = $1")
            .bind(game_id)
            .execute(&mut *conn)
            .await?;
        for key in role_keys {
            sqlx::query(
                "INSERT INTO game_roles (game_id, role_key) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(game_id)
            .bind(key)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }
}
