//! Notional-based order sizing.
//!
//! Quantities are truncated toward zero at the symbol's base precision so a
//! sized order can never exceed the risk amount it was derived from.

use rust_decimal::Decimal;

/// Calculate the notional amount to risk on one sizing decision.
///
/// # Arguments
/// * `available_balance` - Current available account balance
/// * `risk_fraction` - Fraction of the balance to commit (0.0-1.0)
/// * `min_notional` - Exchange-enforced minimum order value for the symbol
///
/// # Returns
/// `max(min_notional, available_balance × risk_fraction)`, guaranteeing the
/// sized order clears the exchange minimum.
#[must_use]
pub fn risk_amount(available_balance: Decimal, risk_fraction: Decimal, min_notional: Decimal) -> Decimal {
    (available_balance * risk_fraction).max(min_notional)
}

/// Convert a risk amount into an order quantity at the given price.
///
/// Truncates toward zero at `base_precision` decimal places, never rounding
/// up, so `quantity × price` cannot exceed `risk_amount`.
///
/// Callers must supply a positive price; the price oracle never returns
/// non-positive values.
#[must_use]
pub fn order_quantity(risk_amount: Decimal, price: Decimal, base_precision: u32) -> Decimal {
    (risk_amount / price).trunc_with_scale(base_precision)
}
