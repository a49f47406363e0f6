//! Price lookup against the live feed.

use contra_core::error::RiskError;
use contra_core::traits::ExchangeApi;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Fetches current prices. No caching: a price is time-sensitive and must
/// be fresh on every call.
pub struct PriceOracle {
    api: Arc<dyn ExchangeApi>,
}

impl PriceOracle {
    pub fn new(api: Arc<dyn ExchangeApi>) -> Self {
        Self { api }
    }

    /// Returns the current price for `symbol`.
    ///
    /// # Errors
    /// Returns `PriceUnavailable` if the feed call fails or the symbol is
    /// absent from the returned map.
    pub async fn current_price(&self, symbol: &str) -> Result<Decimal, RiskError> {
        let prices = self
            .api
            .prices()
            .await
            .map_err(|e| RiskError::price_unavailable(symbol, e.to_string()))?;

        prices
            .get(symbol)
            .copied()
            .ok_or_else(|| RiskError::price_unavailable(symbol, "symbol absent from price feed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use contra_core::types::{AccountSnapshot, AssetInfo, OrderRequest, OrderResult, Position};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    struct StubFeed {
        prices: HashMap<String, Decimal>,
        fail: bool,
    }

    #[async_trait]
    impl ExchangeApi for StubFeed {
        async fn exchange_metadata(&self) -> Result<Vec<AssetInfo>> {
            anyhow::bail!("unused")
        }

        async fn prices(&self) -> Result<HashMap<String, Decimal>> {
            if self.fail {
                anyhow::bail!("feed down");
            }
            Ok(self.prices.clone())
        }

        async fn account(&self) -> Result<AccountSnapshot> {
            anyhow::bail!("unused")
        }

        async fn positions(&self) -> Result<Vec<Position>> {
            anyhow::bail!("unused")
        }

        async fn submit_order(&self, _order: &OrderRequest) -> Result<OrderResult> {
            anyhow::bail!("unused")
        }
    }

    #[tokio::test]
    async fn test_price_lookup() {
        let oracle = PriceOracle::new(Arc::new(StubFeed {
            prices: HashMap::from([("XRPUSDT".to_string(), dec!(0.48))]),
            fail: false,
        }));

        assert_eq!(oracle.current_price("XRPUSDT").await.unwrap(), dec!(0.48));
    }

    #[tokio::test]
    async fn test_absent_symbol_is_price_unavailable() {
        let oracle = PriceOracle::new(Arc::new(StubFeed {
            prices: HashMap::new(),
            fail: false,
        }));

        assert!(matches!(
            oracle.current_price("XRPUSDT").await,
            Err(RiskError::PriceUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_feed_failure_is_price_unavailable() {
        let oracle = PriceOracle::new(Arc::new(StubFeed {
            prices: HashMap::new(),
            fail: true,
        }));

        assert!(matches!(
            oracle.current_price("XRPUSDT").await,
            Err(RiskError::PriceUnavailable { .. })
        ));
    }
}
