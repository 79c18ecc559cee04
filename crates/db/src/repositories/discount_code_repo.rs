//! Repository for `discount_codes`, supported games and buyers.

use market_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::discount_code::{
    CreateDiscountCode, DiscountCode, SupportedGame, UpdateDiscountCode,
};

const COLUMNS: &str = "discount_code, price, buyable, name, description, minimum_price, \
                       maximum_price, minimum_discount, maximum_discount, percentage_discount, \
                       direct_discount, usable_at, usable_closed_at, offered_at, offer_closed_at, \
                       creator_id, latest_updater_id, created_at, updated_at";

pub struct DiscountCodeRepo;

impl DiscountCodeRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateDiscountCode,
        creator_id: DbId,
    ) -> Result<DiscountCode, sqlx::Error> {
        let query = format!(
            "INSERT INTO discount_codes
                (discount_code, price, buyable, name, description, minimum_price, maximum_price,
                 minimum_discount, maximum_discount, percentage_discount, direct_discount,
                 usable_at, usable_closed_at, offered_at, offer_closed_at,
                 creator_id, latest_updater_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DiscountCode>(&query)
            .bind(&input.discount_code)
            .bind(input.price)
            .bind(input.buyable)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.minimum_price)
            .bind(input.maximum_price)
            .bind(input.minimum_discount)
            .bind(input.maximum_discount)
            .bind(input.percentage_discount)
            .bind(input.direct_discount)
            .bind(input.usable_at)
            .bind(input.usable_closed_at)
            .bind(input.offered_at)
            .bind(input.offer_closed_at)
            .bind(creator_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find(pool: &PgPool, code: &str) -> Result<Option<DiscountCode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM discount_codes WHERE discount_code = $1");
        sqlx::query_as::<_, DiscountCode>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<DiscountCode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM discount_codes ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, DiscountCode>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a discount code. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        code: &str,
        input: &UpdateDiscountCode,
        updater_id: DbId,
    ) -> Result<Option<DiscountCode>, sqlx::Error> {
        let query = format!(
            "UPDATE discount_codes SET
                price = COALESCE($2, price),
                buyable = COALESCE($3, buyable),
                name = COALESCE($4, name),
                description = COALESCE($5, description),
                minimum_price = COALESCE($6, minimum_price),
                maximum_price = COALESCE($7, maximum_price),
                minimum_discount = COALESCE($8, minimum_discount),
                maximum_discount = COALESCE($9, maximum_discount),
                percentage_discount = COALESCE($10, percentage_discount),
                direct_discount = COALESCE($11, direct_discount),
                usable_at = COALESCE($12, usable_at),
                usable_closed_at = COALESCE($13, usable_closed_at),
                offered_at = COALESCE($14, offered_at),
                offer_closed_at = COALESCE($15, offer_closed_at),
                latest_updater_id = $16
             WHERE discount_code = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DiscountCode>(&query)
            .bind(code)
            .bind(input.price)
            .bind(input.buyable)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.minimum_price)
            .bind(input.maximum_price)
            .bind(input.minimum_discount)
            .bind(input.maximum_discount)
            .bind(input.percentage_discount)
            .bind(input.direct_discount)
            .bind(input.usable_at)
            .bind(input.usable_closed_at)
            .bind(input.offered_at)
            .bind(input.offer_closed_at)
            .bind(updater_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a discount code. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, code: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM discount_codes WHERE discount_code = $1")
            .bind(code)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Supported games
    // -----------------------------------------------------------------------

    /// Attach a game to a code, or update its type code if already attached.
    pub async fn support_game(
        pool: &PgPool,
        code: &str,
        game_id: DbId,
        type_code: i32,
    ) -> Result<SupportedGame, sqlx::Error> {
        sqlx::query_as::<_, SupportedGame>(
            "INSERT INTO discount_code_supported_games (discount_code, game_id, type_code)
             VALUES ($1, $2, $3)
             ON CONFLICT (discount_code, game_id) DO UPDATE SET type_code = EXCLUDED.type_code
             RETURNING game_id, type_code",
        )
        .bind(code)
        .bind(game_id)
        .bind(type_code)
        .fetch_one(pool)
        .await
    }

    pub async fn supported_games(
        pool: &PgPool,
        code: &str,
    ) -> Result<Vec<SupportedGame>, sqlx::Error> {
        sqlx::query_as::<_, SupportedGame>(
            "SELECT game_id, type_code FROM discount_code_supported_games
             WHERE discount_code = $1 ORDER BY game_id",
        )
        .bind(code)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Buyers
    // -----------------------------------------------------------------------

    pub async fn has_buyer(
        conn: &mut PgConnection,
        code: &str,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM discount_code_buyers WHERE discount_code = $1 AND user_id = $2)",
        )
        .bind(code)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(exists)
    }

    pub async fn add_buyer(
        conn: &mut PgConnection,
        code: &str,
        user_id: DbId,
        price_paid: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO discount_code_buyers (discount_code, user_id, price_paid) VALUES ($1, $2, $3)",
        )
        .bind(code)
        .bind(user_id)
        .bind(price_paid)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn buyer_ids(pool: &PgPool, code: &str) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT user_id FROM discount_code_buyers WHERE discount_code = $1 ORDER BY user_id",
        )
        .bind(code)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
