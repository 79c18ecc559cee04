//! Discount code entity model and DTOs.

use market_core::pricing::DiscountTerms;
use market_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `discount_codes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DiscountCode {
    pub discount_code: String,
    pub price: i64,
    pub buyable: bool,
    pub name: String,
    pub description: Option<String>,
    pub minimum_price: Option<i64>,
    pub maximum_price: Option<i64>,
    pub minimum_discount: Option<i64>,
    pub maximum_discount: Option<i64>,
    pub percentage_discount: i64,
    pub direct_discount: i64,
    pub usable_at: Option<Timestamp>,
    pub usable_closed_at: Option<Timestamp>,
    pub offered_at: Option<Timestamp>,
    pub offer_closed_at: Option<Timestamp>,
    pub creator_id: Option<DbId>,
    pub latest_updater_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DiscountCode {
    pub fn terms(&self) -> DiscountTerms {
        DiscountTerms {
            minimum_price: self.minimum_price,
            maximum_price: self.maximum_price,
            minimum_discount: self.minimum_discount,
            maximum_discount: self.maximum_discount,
            percentage_discount: self.percentage_discount,
            direct_discount: self.direct_discount,
            usable_at: self.usable_at,
            usable_closed_at: self.usable_closed_at,
        }
    }
}

/// A game a discount code can be used for.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SupportedGame {
    pub game_id: DbId,
    pub type_code: i32,
}

/// DTO for creating a discount code.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDiscountCode {
    #[validate(length(min = 1, max = 64))]
    pub discount_code: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub price: i64,
    #[serde(default)]
    pub buyable: bool,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub minimum_price: Option<i64>,
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub maximum_price: Option<i64>,
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub minimum_discount: Option<i64>,
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub maximum_discount: Option<i64>,
    #[serde(default)]
    #[validate(range(min = 0, max = 100))]
    pub percentage_discount: i64,
    #[serde(default)]
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub direct_discount: i64,
    pub usable_at: Option<Timestamp>,
    pub usable_closed_at: Option<Timestamp>,
    pub offered_at: Option<Timestamp>,
    pub offer_closed_at: Option<Timestamp>,
}

/// DTO for updating a discount code. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDiscountCode {
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub price: Option<i64>,
    pub buyable: Option<bool>,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub minimum_price: Option<i64>,
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub maximum_price: Option<i64>,
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub minimum_discount: Option<i64>,
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub maximum_discount: Option<i64>,
    #[validate(range(min = 0, max = 100))]
    pub percentage_discount: Option<i64>,
    #[validate(range(min = 0, max = 1_000_000_000_000i64))]
    pub direct_discount: Option<i64>,
    pub usable_at: Option<Timestamp>,
    pub usable_closed_at: Option<Timestamp>,
    pub offered_at: Option<Timestamp>,
    pub offer_closed_at: Option<Timestamp>,
}
