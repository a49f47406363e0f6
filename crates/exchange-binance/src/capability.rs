//! `ExchangeApi` capability implementation for the Binance client.

use crate::client::BinanceClient;
use anyhow::Result;
use async_trait::async_trait;
use contra_core::traits::ExchangeApi;
use contra_core::types::{AccountSnapshot, AssetInfo, OrderRequest, OrderResult, Position};
use rust_decimal::Decimal;
use std::collections::HashMap;

#[async_trait]
impl ExchangeApi for BinanceClient {
    async fn exchange_metadata(&self) -> Result<Vec<AssetInfo>> {
        Ok(self.exchange_info().await?)
    }

    async fn prices(&self) -> Result<HashMap<String, Decimal>> {
        Ok(self.all_prices().await?)
    }

    async fn account(&self) -> Result<AccountSnapshot> {
        Ok(BinanceClient::account(self).await?)
    }

    async fn positions(&self) -> Result<Vec<Position>> {
        Ok(self.position_risk().await?)
    }

    /// Binance sets leverage per symbol rather than per order, so the
    /// leverage change is applied first and the market order follows.
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderResult> {
        self.set_leverage(&order.symbol, order.leverage).await?;
        let result = self
            .place_market_order(&order.symbol, order.side, order.quantity)
            .await?;
        Ok(result)
    }
}
