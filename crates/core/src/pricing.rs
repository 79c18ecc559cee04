//! Account fee and discount-code arithmetic.
//!
//! All amounts are integer coin values. Percentages are whole percent and
//! use floor division. Intermediate products are computed in `i128` and
//! saturate at the `i64` bounds, so no stored amount can overflow a quote.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Largest coin amount accepted on costs, fees and discount bounds.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

/// One fee bracket of an account type. `None` bounds are open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub minimum_cost: Option<i64>,
    pub maximum_cost: Option<i64>,
    pub minimum_fee: Option<i64>,
    pub maximum_fee: Option<i64>,
    pub percentage_cost: i64,
    pub direct_fee: i64,
}

impl FeeSchedule {
    pub fn applies_to(&self, cost: i64) -> bool {
        within(cost, self.minimum_cost, self.maximum_cost)
    }

    pub fn fee_for(&self, cost: i64) -> i64 {
        let raw = percent_of(cost, self.percentage_cost) + i128::from(self.direct_fee);
        clamp_opt(saturate(raw), self.minimum_fee, self.maximum_fee)
    }
}

/// Fee from the first bracket containing `cost`, or 0.
pub fn calculate_fee(cost: i64, schedules: &[FeeSchedule]) -> i64 {
    schedules
        .iter()
        .find(|s| s.applies_to(cost))
        .map_or(0, |s| s.fee_for(cost))
}

/// Price before any discount code: cost plus fee.
pub fn temporary_price(cost: i64, schedules: &[FeeSchedule]) -> i64 {
    cost.saturating_add(calculate_fee(cost, schedules))
}

// ---------------------------------------------------------------------------
// Discounts
// ---------------------------------------------------------------------------

/// Discount terms of a discount code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscountTerms {
    pub minimum_price: Option<i64>,
    pub maximum_price: Option<i64>,
    pub minimum_discount: Option<i64>,
    pub maximum_discount: Option<i64>,
    pub percentage_discount: i64,
    pub direct_discount: i64,
    pub usable_at: Option<Timestamp>,
    pub usable_closed_at: Option<Timestamp>,
}

impl DiscountTerms {
    pub fn is_usable_at(&self, now: Timestamp) -> bool {
        self.usable_at.map_or(true, |t| now >= t)
            && self.usable_closed_at.map_or(true, |t| now <= t)
    }

    pub fn applies_to(&self, price: i64) -> bool {
        within(price, self.minimum_price, self.maximum_price)
    }

    /// Discount amount for `price`, never more than the price itself.
    pub fn discount_for(&self, price: i64) -> i64 {
        let raw = percent_of(price, self.percentage_discount) + i128::from(self.direct_discount);
        clamp_opt(saturate(raw), self.minimum_discount, self.maximum_discount)
            .clamp(0, price.max(0))
    }
}

/// Final price after applying `terms` at `now`.
pub fn apply_discount(price: i64, terms: &DiscountTerms, now: Timestamp) -> Result<i64, CoreError> {
    if !terms.is_usable_at(now) {
        return Err(CoreError::Validation(
            "Discount code is not usable at this time".into(),
        ));
    }
    if !terms.applies_to(price) {
        return Err(CoreError::Validation(format!(
            "Discount code does not apply to price {price}"
        )));
    }
    Ok(price - terms.discount_for(price))
}

// ---------------------------------------------------------------------------
// Discount-code purchase
// ---------------------------------------------------------------------------

/// Whether a discount code is on offer at `now`.
pub fn ensure_offer_open(
    buyable: bool,
    offered_at: Option<Timestamp>,
    offer_closed_at: Option<Timestamp>,
    now: Timestamp,
) -> Result<(), CoreError> {
    let open = buyable
        && offered_at.map_or(true, |t| now >= t)
        && offer_closed_at.map_or(true, |t| now <= t);
    if open {
        Ok(())
    } else {
        Err(CoreError::Conflict("Discount code is not on offer".into()))
    }
}

/// Balance after paying `price`, or an error if `balance` is too low.
pub fn charge(balance: i64, price: i64) -> Result<i64, CoreError> {
    if price < 0 {
        return Err(CoreError::Validation("Price must not be negative".into()));
    }
    if balance < price {
        return Err(CoreError::InsufficientFunds { balance, price });
    }
    Ok(balance - price)
}

fn percent_of(value: i64, percentage: i64) -> i128 {
    i128::from(value) * i128::from(percentage) / 100
}

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

fn within(value: i64, min: Option<i64>, max: Option<i64>) -> bool {
    min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
}

fn clamp_opt(value: i64, min: Option<i64>, max: Option<i64>) -> i64 {
    let value = min.map_or(value, |m| value.max(m));
    max.map_or(value, |m| value.min(m))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn bracket(min: Option<i64>, max: Option<i64>, pct: i64, direct: i64) -> FeeSchedule {
        FeeSchedule {
            minimum_cost: min,
            maximum_cost: max,
            percentage_cost: pct,
            direct_fee: direct,
            ..Default::default()
        }
    }

    #[test]
    fn first_matching_bracket_wins() {
        let schedules = vec![
            bracket(None, Some(99), 0, 5),
            bracket(Some(100), None, 10, 0),
        ];
        assert_eq!(calculate_fee(50, &schedules), 5);
        assert_eq!(calculate_fee(250, &schedules), 25);
        assert_eq!(temporary_price(250, &schedules), 275);
    }

    #[test]
    fn no_bracket_means_no_fee() {
        let schedules = vec![bracket(Some(1000), None, 10, 0)];
        assert_eq!(calculate_fee(10, &schedules), 0);
        assert_eq!(temporary_price(10, &[]), 10);
    }

    #[test]
    fn fee_is_clamped() {
        let mut s = bracket(None, None, 50, 0);
        s.minimum_fee = Some(10);
        s.maximum_fee = Some(100);
        assert_eq!(s.fee_for(4), 10);
        assert_eq!(s.fee_for(1000), 100);
        assert_eq!(s.fee_for(60), 30);
    }

    #[test]
    fn large_costs_saturate_instead_of_overflowing() {
        let schedules = vec![bracket(None, None, 10, 0)];
        let cost = i64::MAX / 4;
        assert_eq!(calculate_fee(cost, &schedules), cost / 10);
        assert_eq!(temporary_price(cost, &schedules), cost + cost / 10);

        let greedy = vec![bracket(None, None, 1000, i64::MAX)];
        assert_eq!(calculate_fee(cost, &greedy), i64::MAX);
        assert_eq!(temporary_price(cost, &greedy), i64::MAX);

        let terms = DiscountTerms {
            percentage_discount: 50,
            direct_discount: i64::MAX,
            ..Default::default()
        };
        assert_eq!(terms.discount_for(i64::MAX), i64::MAX);
    }

    #[test]
    fn discount_never_exceeds_price() {
        let terms = DiscountTerms {
            direct_discount: 500,
            ..Default::default()
        };
        assert_eq!(terms.discount_for(100), 100);
        assert_eq!(apply_discount(100, &terms, Utc::now()).unwrap(), 0);
    }

    #[test]
    fn discount_respects_window_and_range() {
        let now = Utc::now();
        let terms = DiscountTerms {
            minimum_price: Some(100),
            percentage_discount: 20,
            maximum_discount: Some(30),
            usable_at: Some(now - Duration::days(1)),
            usable_closed_at: Some(now + Duration::days(1)),
            ..Default::default()
        };
        assert_eq!(apply_discount(100, &terms, now).unwrap(), 80);
        assert_eq!(apply_discount(1000, &terms, now).unwrap(), 970);
        assert!(apply_discount(50, &terms, now).is_err());
        assert!(apply_discount(100, &terms, now + Duration::days(2)).is_err());
    }

    #[test]
    fn offer_window() {
        let now = Utc::now();
        assert!(ensure_offer_open(true, None, None, now).is_ok());
        assert!(ensure_offer_open(false, None, None, now).is_err());
        assert!(ensure_offer_open(true, Some(now + Duration::hours(1)), None, now).is_err());
        assert!(ensure_offer_open(true, None, Some(now - Duration::hours(1)), now).is_err());
    }

    #[test]
    fn charge_requires_funds() {
        assert_eq!(charge(100, 30).unwrap(), 70);
        assert_eq!(charge(30, 30).unwrap(), 0);
        assert!(matches!(
            charge(10, 30),
            Err(CoreError::InsufficientFunds { balance: 10, price: 30 })
        ));
        assert!(matches!(charge(10, -1), Err(CoreError::Validation(_))));
    }
}
