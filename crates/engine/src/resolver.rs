//! Asset metadata resolution with a per-symbol cache.

use contra_core::error::RiskError;
use contra_core::traits::ExchangeApi;
use contra_core::types::AssetInfo;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves per-symbol trading constraints from the exchange listing.
///
/// Resolution is idempotent and memoized: the first call for a symbol
/// fetches the full listing, later calls hit the cache. Entries are never
/// evicted; exchange trading rules are stable for the life of a run.
pub struct AssetResolver {
    api: Arc<dyn ExchangeApi>,
    cache: RwLock<HashMap<String, AssetInfo>>,
}

impl AssetResolver {
    /// Creates a resolver with an empty cache.
    pub fn new(api: Arc<dyn ExchangeApi>) -> Self {
        Self {
            api,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolves trading constraints for `symbol`.
    ///
    /// # Errors
    /// Returns `MetadataUnavailable` if the listing call fails or the
    /// symbol has no usable entry.
    pub async fn resolve(&self, symbol: &str) -> Result<AssetInfo, RiskError> {
        if let Some(info) = self.cache.read().get(symbol) {
            return Ok(info.clone());
        }

        let listing = self
            .api
            .exchange_metadata()
            .await
            .map_err(|e| RiskError::metadata_unavailable(symbol, e.to_string()))?;

        let info = listing
            .into_iter()
            .find(|a| a.symbol == symbol)
            .ok_or_else(|| {
                RiskError::metadata_unavailable(symbol, "symbol absent from exchange listing")
            })?;

        tracing::debug!(symbol = %symbol, min_notional = %info.min_notional, "resolved asset metadata");

        // Insert-if-absent: a racing resolve keeps the first value.
        Ok(self
            .cache
            .write()
            .entry(symbol.to_string())
            .or_insert(info)
            .clone())
    }
}
