//! Raw Binance futures API models and conversions into core types.
//!
//! Binance serializes most numeric fields as strings; conversions parse them
//! into `Decimal` and fail loudly rather than defaulting, since a silently
//! zeroed balance or position would corrupt sizing decisions downstream.

use crate::error::{BinanceError, Result};
use contra_core::types::{AccountSnapshot, AssetInfo, Position};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

/// Filter type carrying the minimum order value.
const MIN_NOTIONAL_FILTER: &str = "MIN_NOTIONAL";

// =============================================================================
// Exchange metadata
// =============================================================================

/// Raw `GET /fapi/v1/exchangeInfo` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawExchangeInfo {
    pub symbols: Vec<RawSymbolInfo>,
}

/// One symbol entry of the exchange listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSymbolInfo {
    pub symbol: String,
    pub base_asset_precision: u32,
    pub quote_precision: u32,
    #[serde(default)]
    pub filters: Vec<RawSymbolFilter>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSymbolFilter {
    pub filter_type: String,
    #[serde(default)]
    pub notional: Option<String>,
}

impl RawSymbolInfo {
    /// Converts into an [`AssetInfo`], or `None` when the entry carries no
    /// parseable `MIN_NOTIONAL` filter.
    pub(crate) fn into_asset_info(self) -> Option<AssetInfo> {
        let min_notional = self
            .filters
            .iter()
            .find(|f| f.filter_type == MIN_NOTIONAL_FILTER)
            .and_then(|f| f.notional.as_deref())
            .and_then(|v| Decimal::from_str(v).ok())?;

        Some(AssetInfo {
            symbol: self.symbol,
            base_precision: self.base_asset_precision,
            quote_precision: self.quote_precision,
            min_notional,
        })
    }
}

// =============================================================================
// Prices
// =============================================================================

/// One entry of the `GET /fapi/v1/ticker/price` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawPriceTicker {
    pub symbol: String,
    pub price: String,
}

impl RawPriceTicker {
    pub(crate) fn parse_price(&self) -> Result<Decimal> {
        Decimal::from_str(&self.price).map_err(|e| {
            BinanceError::Serialization(format!("price for {}: {e}", self.symbol))
        })
    }
}

// =============================================================================
// Account
// =============================================================================

/// Raw `GET /fapi/v2/account` response, reduced to what the core consumes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawAccountInfo {
    pub available_balance: String,
}

impl RawAccountInfo {
    pub(crate) fn into_snapshot(self) -> Result<AccountSnapshot> {
        let available_balance = Decimal::from_str(&self.available_balance)
            .map_err(|e| BinanceError::Serialization(format!("availableBalance: {e}")))?;
        Ok(AccountSnapshot { available_balance })
    }
}

// =============================================================================
// Positions
// =============================================================================

/// One record of the `GET /fapi/v2/positionRisk` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPositionRisk {
    pub symbol: String,
    pub position_amt: String,
    pub entry_price: String,
    pub mark_price: String,
    pub leverage: String,
    pub un_realized_profit: String,
}

impl RawPositionRisk {
    pub(crate) fn into_position(self) -> Result<Position> {
        let field = |name: &str, value: &str| -> Result<Decimal> {
            Decimal::from_str(value).map_err(|e| {
                BinanceError::Serialization(format!("{name} for {}: {e}", self.symbol))
            })
        };

        let position_amt = field("positionAmt", &self.position_amt)?;
        let entry_price = field("entryPrice", &self.entry_price)?;
        let mark_price = field("markPrice", &self.mark_price)?;
        let unrealized_profit = field("unRealizedProfit", &self.un_realized_profit)?;
        let leverage = self.leverage.parse::<u32>().map_err(|e| {
            BinanceError::Serialization(format!("leverage for {}: {e}", self.symbol))
        })?;

        Ok(Position {
            symbol: self.symbol,
            position_amt,
            entry_price,
            mark_price,
            leverage,
            unrealized_profit,
        })
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Raw `POST /fapi/v1/order` acknowledgment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawOrderAck {
    pub order_id: i64,
    pub symbol: String,
    #[serde(default)]
    #[allow(dead_code)]
    pub status: Option<String>,
}

/// Raw `GET /fapi/v1/time` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawServerTime {
    pub server_time: i64,
}
