//! Capability traits at the exchange seam.
//!
//! Components depend on these traits rather than on a concrete client so
//! tests can substitute doubles for every exchange interaction.

use crate::error::RiskError;
use crate::types::{AccountSnapshot, AssetInfo, OrderRequest, OrderResult, Position};
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// The exchange capability set consumed by the decision engine.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Fetches the full symbol-metadata listing.
    async fn exchange_metadata(&self) -> Result<Vec<AssetInfo>>;

    /// Fetches the current price of every tradable symbol.
    async fn prices(&self) -> Result<HashMap<String, Decimal>>;

    /// Queries the trading account balance.
    async fn account(&self) -> Result<AccountSnapshot>;

    /// Queries all position records, including flat ones.
    async fn positions(&self) -> Result<Vec<Position>>;

    /// Submits a market order at the request's leverage.
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderResult>;
}

/// Order placement, selected once at startup: live submission or a
/// simulated variant that never touches the exchange.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Places (or simulates) the given order.
    async fn place(&self, order: &OrderRequest) -> Result<OrderResult, RiskError>;
}
