//! Domain types for the position manager.
//!
//! All financial values use `rust_decimal::Decimal` for precision.
//! Position snapshots come from the exchange and are never mutated locally.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Order Side
// =============================================================================

/// Side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy (long-increasing).
    Buy,
    /// Sell (short-increasing).
    Sell,
}

impl Side {
    /// Returns the opposite side.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Returns the API string representation.
    #[must_use]
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

// =============================================================================
// Asset Metadata
// =============================================================================

/// Trading constraints for one symbol, resolved from exchange metadata.
///
/// Immutable once resolved; the resolver caches one instance per symbol for
/// the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    /// Trading-pair identifier (e.g., "DOGEUSDT").
    pub symbol: String,

    /// Decimal places allowed on order quantity.
    pub base_precision: u32,

    /// Decimal places of the quote asset.
    pub quote_precision: u32,

    /// Exchange-enforced minimum order value (quantity × price).
    pub min_notional: Decimal,
}

// =============================================================================
// Position
// =============================================================================

/// A position snapshot from the exchange.
///
/// `position_amt` is signed: positive = long, negative = short, zero = flat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Trading-pair identifier.
    pub symbol: String,

    /// Signed position size in base-asset units.
    pub position_amt: Decimal,

    /// Average entry price.
    pub entry_price: Decimal,

    /// Current mark price.
    pub mark_price: Decimal,

    /// Leverage multiplier backing the position.
    pub leverage: u32,

    /// Unrealized profit in quote-asset units, signed.
    pub unrealized_profit: Decimal,
}

impl Position {
    /// Returns true if the position has exposure.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.position_amt.is_zero()
    }

    /// Returns true for a long position.
    #[must_use]
    pub fn is_long(&self) -> bool {
        self.position_amt > Decimal::ZERO
    }

    /// Returns the side that flips this position: SELL for a long,
    /// BUY for a short.
    #[must_use]
    pub fn reversal_side(&self) -> Side {
        if self.is_long() {
            Side::Sell
        } else {
            Side::Buy
        }
    }

    /// Returns the current market value of the position, signed.
    #[must_use]
    pub fn current_value(&self) -> Decimal {
        self.position_amt * self.mark_price
    }
}

// =============================================================================
// Account
// =============================================================================

/// Account balance snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Balance available for new margin, in quote-asset units.
    pub available_balance: Decimal,
}

// =============================================================================
// Orders
// =============================================================================

/// Request to place a market order.
///
/// Transient: constructed and consumed within one decision, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    /// Trading-pair identifier.
    pub symbol: String,

    /// Order side.
    pub side: Side,

    /// Order quantity, already truncated to the symbol's base precision.
    pub quantity: Decimal,

    /// Leverage to trade the symbol at.
    pub leverage: u32,
}

impl OrderRequest {
    /// Creates a market order request.
    pub fn market(symbol: impl Into<String>, side: Side, quantity: Decimal, leverage: u32) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            leverage,
        }
    }
}

/// Acknowledgment of a placed (or simulated) order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    /// Exchange-assigned order ID; absent for simulated placements.
    pub order_id: Option<String>,

    /// Trading-pair identifier.
    pub symbol: String,

    /// Order side.
    pub side: Side,

    /// Quantity submitted.
    pub quantity: Decimal,

    /// True when the order never reached the exchange.
    pub simulated: bool,

    /// When the placement decision was made.
    pub timestamp: DateTime<Utc>,
}

impl OrderResult {
    /// Creates a result for a simulated placement.
    #[must_use]
    pub fn simulated(order: &OrderRequest) -> Self {
        Self {
            order_id: None,
            symbol: order.symbol.clone(),
            side: order.side,
            quantity: order.quantity,
            simulated: true,
            timestamp: Utc::now(),
        }
    }
}
