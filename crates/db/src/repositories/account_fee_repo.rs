//! Repository for the `account_fees` table.

use market_core::types::DbId;
use sqlx::PgPool;

use crate::models::account_fee::{AccountFee, CreateAccountFee};

const COLUMNS: &str = "id, account_type_id, minimum_cost, maximum_cost, minimum_fee, maximum_fee, \
                       percentage_cost, direct_fee, creator_id, latest_updater_id, created_at, updated_at";

pub struct AccountFeeRepo;

impl AccountFeeRepo {
    pub async fn create(
        pool: &PgPool,
        account_type_id: DbId,
        input: &CreateAccountFee,
        creator_id: DbId,
    ) -> Result<AccountFee, sqlx::Error> {
        let query = format!(
            "INSERT INTO account_fees
                (account_type_id, minimum_cost, maximum_cost, minimum_fee, maximum_fee,
                 percentage_cost, direct_fee, creator_id, latest_updater_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AccountFee>(&query)
            .bind(account_type_id)
            .bind(input.minimum_cost)
            .bind(input.maximum_cost)
            .bind(input.minimum_fee)
            .bind(input.maximum_fee)
            .bind(input.percentage_cost)
            .bind(input.direct_fee)
            .bind(creator_id)
            .fetch_one(pool)
            .await
    }

    /// Fee brackets of an account type, oldest first. The first bracket
    /// containing a cost is the one applied.
    pub async fn list_by_account_type(
        pool: &PgPool,
        account_type_id: DbId,
    ) -> Result<Vec<AccountFee>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM account_fees WHERE account_type_id = $1 ORDER BY id");
        sqlx::query_as::<_, AccountFee>(&query)
            .bind(account_type_id)
            .fetch_all(pool)
            .await
    }
}
