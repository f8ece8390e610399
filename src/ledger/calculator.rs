//! Bill arithmetic: subtotal, discount, clamped total and balance due

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::*;

/// Parse a user-entered amount, treating anything unparsable as zero
pub fn parse_amount(input: &str) -> BigDecimal {
    parse_amount_strict(input).unwrap_or_else(BigDecimal::zero)
}

/// Longest amount text accepted, after trimming
const MAX_AMOUNT_LEN: usize = 40;
/// Largest exponent magnitude accepted in `1e5` style input
const MAX_EXPONENT: i64 = 30;

/// Parse a user-entered amount, returning `None` when it is not a number
///
/// Overlong input and exponents beyond ±30 are refused, so every parsed
/// amount keeps a small scale and digit count.
pub fn parse_amount_strict(input: &str) -> Option<BigDecimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_AMOUNT_LEN {
        return None;
    }

    if let Some((_, exponent)) = trimmed.split_once(|c: char| c.eq_ignore_ascii_case(&'e')) {
        let exponent = exponent.parse::<i64>().ok()?;
        if !(-MAX_EXPONENT..=MAX_EXPONENT).contains(&exponent) {
            return None;
        }
    }

    BigDecimal::from_str(trimmed).ok()
}

/// Round to paise, half away from zero
pub fn round_money(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(2, RoundingMode::HalfUp)
}

/// Clamp negative amounts to zero
fn non_negative(amount: BigDecimal) -> BigDecimal {
    if amount < BigDecimal::zero() {
        BigDecimal::zero()
    } else {
        amount
    }
}

/// Compute the bill total from raw form input
///
/// Every field is parsed leniently, so `calculate("abc", "2", "", mode)`
/// is `0.00`. The result is clamped at zero and rounded to two places.
pub fn calculate(rate: &str, quantity: &str, discount: &str, mode: DiscountMode) -> BigDecimal {
    BillBreakdown::compute(
        &parse_amount(rate),
        &parse_amount(quantity),
        &parse_amount(discount),
        mode,
        &BigDecimal::zero(),
    )
    .total
}

/// Every intermediate figure of a bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillBreakdown {
    pub subtotal: BigDecimal,
    pub discount_amount: BigDecimal,
    /// `max(0, subtotal - discount_amount)`, rounded to two places
    pub total: BigDecimal,
    pub received: BigDecimal,
    /// `max(0, total - received)`, rounded to two places
    pub balance_due: BigDecimal,
}

impl BillBreakdown {
    /// Compute a bill from parsed figures
    pub fn compute(
        rate: &BigDecimal,
        quantity: &BigDecimal,
        discount: &BigDecimal,
        mode: DiscountMode,
        received: &BigDecimal,
    ) -> Self {
        let subtotal = rate * quantity;
        let discount_amount = match mode {
            DiscountMode::Percentage => (&subtotal * discount) / BigDecimal::from(100),
            DiscountMode::Absolute => discount.clone(),
        };
        let total = round_money(&non_negative(&subtotal - &discount_amount));
        let balance_due = round_money(&non_negative(&total - received));

        Self {
            subtotal,
            discount_amount,
            total,
            received: received.clone(),
            balance_due,
        }
    }

    /// Recompute the bill a stored customer record describes
    pub fn for_customer(customer: &Customer) -> Self {
        Self::compute(
            &customer.rate,
            &customer.quantity,
            customer.discount(),
            customer.discount_mode(),
            &customer.received_amt,
        )
    }
}
