//! Order placement variants: live submission or simulation.
//!
//! The variant is chosen once at startup from configuration. The simulated
//! gateway makes zero exchange calls; it is impossible to trade live
//! through it.

use async_trait::async_trait;
use contra_core::error::RiskError;
use contra_core::traits::{ExchangeApi, OrderGateway};
use contra_core::types::{OrderRequest, OrderResult};
use std::sync::Arc;

/// Submits orders to the exchange.
pub struct LiveGateway {
    api: Arc<dyn ExchangeApi>,
}

impl LiveGateway {
    pub fn new(api: Arc<dyn ExchangeApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl OrderGateway for LiveGateway {
    async fn place(&self, order: &OrderRequest) -> Result<OrderResult, RiskError> {
        tracing::info!(
            symbol = %order.symbol,
            side = order.side.as_api_str(),
            quantity = %order.quantity,
            leverage = order.leverage,
            "submitting market order"
        );

        self.api
            .submit_order(order)
            .await
            .map_err(|e| RiskError::order_rejected(&order.symbol, e.to_string()))
    }
}

/// Logs intended orders without submitting anything.
pub struct SimulatedGateway;

#[async_trait]
impl OrderGateway for SimulatedGateway {
    async fn place(&self, order: &OrderRequest) -> Result<OrderResult, RiskError> {
        tracing::info!(
            "[SIMULATION] {} {} quantity {} at {}x leverage",
            order.side.as_api_str(),
            order.symbol,
            order.quantity,
            order.leverage
        );

        Ok(OrderResult::simulated(order))
    }
}
