//! Account fee entity model and DTOs.

use market_core::pricing::FeeSchedule;
use market_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `account_fees` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AccountFee {
    pub id: DbId,
    pub account_type_id: DbId,
    pub minimum_cost: Option<i64>,
    pub maximum_cost: Option<i64>,
    pub minimum_fee: Option<i64>,
    pub maximum_fee: Option<i64>,
    pub percentage_cost: i64,
    pub direct_fee: i64,
    pub creator_id: Option<DbId>,
    pub latest_updater_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AccountFee {
    pub fn schedule(&self) -> FeeSchedule {
        FeeSchedule {
            minimum_cost: self.minimum_cost,
            maximum_cost: self.maximum_cost,
            minimum_fee: self.minimum_fee,
            maximum_fee: self.maximum_fee,
            percentage_cost: self.percentage_cost,
            direct_fee: self.direct_fee,
        }
    }
}

/// DTO for adding a fee bracket to an account type.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAccountFee {
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub minimum_cost: Option<i64>,
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub maximum_cost: Option<i64>,
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub minimum_fee: Option<i64>,
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub maximum_fee: Option<i64>,
    #[serde(default)]
    #[validate(range(min = 0, max = 100))]
    pub percentage_cost: i64,
    #[serde(default)]
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub direct_fee: i64,
}
