//! Discount-code purchase and price quotes.

use chrono::Utc;
use market_core::error::CoreError;
use market_core::pricing::{apply_discount, charge, ensure_offer_open, temporary_price};
use market_core::types::DbId;
use market_db::models::discount_code::DiscountCode;
use market_db::repositories::{
    AccountFeeRepo, AccountRepo, AccountTypeRepo, DiscountCodeRepo, UserRepo,
};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::middleware::actor::Actor;

/// Result of buying a discount code.
#[derive(Debug, Serialize)]
pub struct DiscountPurchase {
    pub discount_code: String,
    pub price_paid: i64,
    /// Buyer's silver coins after the purchase.
    pub silver_coin: i64,
}

/// Price of an account with and without a discount code.
#[derive(Debug, Serialize)]
pub struct PriceQuote {
    pub account_id: DbId,
    pub temporary_price: i64,
    pub discount_code: Option<String>,
    pub price: i64,
}

pub async fn find_code(pool: &PgPool, code: &str) -> AppResult<DiscountCode> {
    DiscountCodeRepo::find(pool, code)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::KeyNotFound {
                entity: "DiscountCode",
                key: code.to_string(),
            })
        })
}

/// Buy `code` for the actor with silver coins.
///
/// The balance check, the deduction and the buyer row happen in one
/// transaction with the user row locked, so a failed check writes nothing.
pub async fn buy(pool: &PgPool, actor: &Actor, code: &str) -> AppResult<DiscountPurchase> {
    let discount = find_code(pool, code).await?;
    ensure_offer_open(
        discount.buyable,
        discount.offered_at,
        discount.offer_closed_at,
        Utc::now(),
    )?;

    let mut tx = pool.begin().await?;

    let user = UserRepo::find_for_update(&mut *tx, actor.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: actor.user_id,
        }))?;

    if DiscountCodeRepo::has_buyer(&mut *tx, &discount.discount_code, user.id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Discount code '{}' has already been bought",
            discount.discount_code
        ))));
    }

    let balance = charge(user.silver_coin, discount.price)?;
    UserRepo::set_silver_coin(&mut *tx, user.id, balance).await?;
    DiscountCodeRepo::add_buyer(&mut *tx, &discount.discount_code, user.id, discount.price)
        .await?;

    tx.commit().await?;

    tracing::info!(
        user_id = user.id,
        discount_code = %discount.discount_code,
        price = discount.price,
        "Discount code bought"
    );
    Ok(DiscountPurchase {
        discount_code: discount.discount_code,
        price_paid: discount.price,
        silver_coin: balance,
    })
}

/// Quote the price of an account, optionally with a discount code.
///
/// The code must support the account's game.
pub async fn quote(
    pool: &PgPool,
    account_id: DbId,
    code: Option<&str>,
) -> AppResult<PriceQuote> {
    let account = AccountRepo::find_by_id(pool, account_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Account",
            id: account_id,
        }))?;
    let schedules: Vec<_> = AccountFeeRepo::list_by_account_type(pool, account.account_type_id)
        .await?
        .iter()
        .map(|fee| fee.schedule())
        .collect();
    let base = temporary_price(account.cost, &schedules);

    let Some(code) = code else {
        return Ok(PriceQuote {
            account_id,
            temporary_price: base,
            discount_code: None,
            price: base,
        });
    };

    let discount = find_code(pool, code).await?;
    let account_type = AccountTypeRepo::find_by_id(pool, account.account_type_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AccountType",
            id: account.account_type_id,
        }))?;
    let supported = DiscountCodeRepo::supported_games(pool, &discount.discount_code).await?;
    if !supported.iter().any(|g| g.game_id == account_type.game_id) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Discount code '{}' does not apply to this game",
            discount.discount_code
        ))));
    }

    let price = apply_discount(base, &discount.terms(), Utc::now())?;
    Ok(PriceQuote {
        account_id,
        temporary_price: base,
        discount_code: Some(discount.discount_code),
        price,
    })
}
