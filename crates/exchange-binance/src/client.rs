//! Binance USD-M futures REST client with rate limiting.
//!
//! Public endpoints (metadata, prices, server time) are unsigned; account,
//! position, leverage, and order endpoints are signed per `auth`. Every
//! request waits on a shared rate limiter first. The client performs no
//! retries: transient failures surface to the caller.

use crate::auth::{BinanceAuth, BinanceAuthConfig};
use crate::error::{BinanceError, Result};
use crate::types::{
    RawAccountInfo, RawExchangeInfo, RawOrderAck, RawPositionRisk, RawPriceTicker, RawServerTime,
};
use chrono::Utc;
use contra_core::types::{AccountSnapshot, AssetInfo, OrderResult, Position, Side};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

// =============================================================================
// Constants
// =============================================================================

/// Binance USD-M futures production API base URL.
pub const FAPI_PROD_URL: &str = "https://fapi.binance.com";

/// Binance USD-M futures testnet API base URL.
pub const FAPI_TESTNET_URL: &str = "https://testnet.binancefuture.com";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the Binance client.
#[derive(Debug, Clone)]
pub struct BinanceClientConfig {
    /// Base URL for the API.
    pub base_url: String,

    /// Authentication configuration.
    pub auth_config: BinanceAuthConfig,

    /// Requests per minute limit.
    pub requests_per_minute: NonZeroU32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// `recvWindow` in milliseconds for signed requests.
    pub recv_window_ms: u64,
}

impl Default for BinanceClientConfig {
    fn default() -> Self {
        Self {
            base_url: FAPI_PROD_URL.to_string(),
            auth_config: BinanceAuthConfig::default(),
            requests_per_minute: nonzero!(1200u32),
            timeout_secs: 30,
            recv_window_ms: 5000,
        }
    }
}

impl BinanceClientConfig {
    /// Creates a configuration for production.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Creates a configuration for the futures testnet.
    #[must_use]
    pub fn testnet() -> Self {
        Self {
            base_url: FAPI_TESTNET_URL.to_string(),
            ..Default::default()
        }
    }

    /// Builds a configuration from application settings.
    #[must_use]
    pub fn from_settings(settings: &contra_core::BinanceConfig) -> Self {
        Self {
            base_url: settings.api_url.clone(),
            auth_config: BinanceAuthConfig::default(),
            requests_per_minute: NonZeroU32::new(settings.requests_per_minute)
                .unwrap_or(nonzero!(1200u32)),
            timeout_secs: settings.timeout_secs,
            recv_window_ms: settings.recv_window_ms,
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the authentication configuration.
    #[must_use]
    pub fn with_auth_config(mut self, config: BinanceAuthConfig) -> Self {
        self.auth_config = config;
        self
    }

    /// Sets the rate limit.
    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.requests_per_minute = requests_per_minute;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

// =============================================================================
// BinanceClient
// =============================================================================

/// Binance futures REST client.
///
/// All requests are rate-limited; signed requests carry a timestamp adjusted
/// by the last `sync_time` offset so signatures stay inside the server's
/// `recvWindow`.
pub struct BinanceClient {
    /// Configuration.
    config: BinanceClientConfig,

    /// HTTP client.
    http: Client,

    /// Rate limiter.
    rate_limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,

    /// Authentication handler.
    auth: BinanceAuth,

    /// Server-minus-local clock offset in milliseconds.
    clock_offset_ms: AtomicI64,
}

impl std::fmt::Debug for BinanceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceClient")
            .field("base_url", &self.config.base_url)
            .field("requests_per_minute", &self.config.requests_per_minute)
            .finish_non_exhaustive()
    }
}

impl BinanceClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if credentials are missing or the HTTP client cannot
    /// be built.
    pub fn new(config: BinanceClientConfig) -> Result<Self> {
        let auth = BinanceAuth::from_env(&config.auth_config)?;

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BinanceError::Network(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_minute(config.requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            config,
            http,
            rate_limiter,
            auth,
            clock_offset_ms: AtomicI64::new(0),
        })
    }

    /// Creates a client for production.
    ///
    /// # Errors
    /// Returns error if credentials are missing.
    pub fn production() -> Result<Self> {
        Self::new(BinanceClientConfig::production())
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Validates a symbol string before it is embedded in a query.
    ///
    /// Binance futures symbols are uppercase alphanumeric (e.g. "XRPUSDT").
    fn validate_symbol(symbol: &str) -> Result<&str> {
        if symbol.is_empty() {
            return Err(BinanceError::InvalidRequest(
                "symbol cannot be empty".to_string(),
            ));
        }
        if !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(BinanceError::InvalidRequest(format!(
                "invalid symbol: must be alphanumeric: {symbol}"
            )));
        }
        if symbol.len() > 24 {
            return Err(BinanceError::InvalidRequest(format!(
                "invalid symbol: exceeds maximum length of 24: {}",
                symbol.len()
            )));
        }
        Ok(symbol)
    }

    /// Current signed-request timestamp: local clock plus the last
    /// synchronized server offset.
    fn timestamp_ms(&self) -> i64 {
        Utc::now().timestamp_millis() + self.clock_offset_ms.load(Ordering::Relaxed)
    }

    /// Waits for the rate limiter and makes an unsigned GET request.
    async fn get_public<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.config.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Appends timestamp, recvWindow, and signature to a query string.
    fn signed_query(&self, query: &str) -> Result<String> {
        let base = if query.is_empty() {
            format!(
                "recvWindow={}&timestamp={}",
                self.config.recv_window_ms,
                self.timestamp_ms()
            )
        } else {
            format!(
                "{query}&recvWindow={}&timestamp={}",
                self.config.recv_window_ms,
                self.timestamp_ms()
            )
        };
        let signature = self.auth.sign(&base)?;
        Ok(format!("{base}&signature={signature}"))
    }

    /// Waits for the rate limiter and makes a signed GET request.
    async fn get_signed<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &str,
    ) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let signed = self.signed_query(query)?;
        let url = format!("{}{}?{}", self.config.base_url, path, signed);
        tracing::debug!("GET {} (signed)", path);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .header("X-MBX-APIKEY", self.auth.api_key())
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Waits for the rate limiter and makes a signed POST request.
    ///
    /// Binance accepts POST parameters in the query string; the body stays
    /// empty.
    async fn post_signed<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &str,
    ) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let signed = self.signed_query(query)?;
        let url = format!("{}{}?{}", self.config.base_url, path, signed);
        tracing::debug!("POST {} (signed)", path);

        let response = self
            .http
            .post(&url)
            .header("Accept", "application/json")
            .header("X-MBX-APIKEY", self.auth.api_key())
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Handles API response, converting errors appropriately.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(BinanceError::rate_limit(retry_after));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BinanceError::api(status.as_u16(), text));
        }

        let body = response.json::<T>().await?;
        Ok(body)
    }

    // =========================================================================
    // Public Endpoints
    // =========================================================================

    /// Fetches the symbol-metadata listing.
    ///
    /// Entries without a parseable `MIN_NOTIONAL` filter are dropped.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn exchange_info(&self) -> Result<Vec<AssetInfo>> {
        let response: RawExchangeInfo = self.get_public("/fapi/v1/exchangeInfo").await?;

        let total = response.symbols.len();
        let assets: Vec<AssetInfo> = response
            .symbols
            .into_iter()
            .filter_map(crate::types::RawSymbolInfo::into_asset_info)
            .collect();

        if assets.len() < total {
            tracing::debug!(
                dropped = total - assets.len(),
                "exchangeInfo entries without MIN_NOTIONAL filter"
            );
        }

        Ok(assets)
    }

    /// Fetches the current price of every tradable symbol.
    ///
    /// # Errors
    /// Returns error if the API call fails or a price does not parse.
    pub async fn all_prices(&self) -> Result<HashMap<String, Decimal>> {
        let tickers: Vec<RawPriceTicker> = self.get_public("/fapi/v1/ticker/price").await?;

        let mut prices = HashMap::with_capacity(tickers.len());
        for ticker in tickers {
            let price = ticker.parse_price()?;
            prices.insert(ticker.symbol, price);
        }
        Ok(prices)
    }

    /// Synchronizes the signed-request clock with the exchange.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn sync_time(&self) -> Result<()> {
        let response: RawServerTime = self.get_public("/fapi/v1/time").await?;
        let offset = response.server_time - Utc::now().timestamp_millis();
        self.clock_offset_ms.store(offset, Ordering::Relaxed);
        tracing::debug!(offset_ms = offset, "synchronized server time");
        Ok(())
    }

    // =========================================================================
    // Account Endpoints
    // =========================================================================

    /// Queries the trading account balance.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn account(&self) -> Result<AccountSnapshot> {
        let raw: RawAccountInfo = self.get_signed("/fapi/v2/account", "").await?;
        raw.into_snapshot()
    }

    /// Queries all position records, one per symbol with any historical
    /// exposure (flat positions included).
    ///
    /// # Errors
    /// Returns error if the API call fails or a record does not parse.
    pub async fn position_risk(&self) -> Result<Vec<Position>> {
        let raw: Vec<RawPositionRisk> = self.get_signed("/fapi/v2/positionRisk", "").await?;
        raw.into_iter().map(RawPositionRisk::into_position).collect()
    }

    // =========================================================================
    // Trade Endpoints
    // =========================================================================

    /// Sets the leverage for a symbol.
    ///
    /// # Errors
    /// Returns error if the exchange rejects the change.
    pub async fn set_leverage(&self, symbol: &str, leverage: u32) -> Result<()> {
        let symbol = Self::validate_symbol(symbol)?;
        let query = format!("symbol={symbol}&leverage={leverage}");
        let _: serde_json::Value = self.post_signed("/fapi/v1/leverage", &query).await?;
        Ok(())
    }

    /// Submits a market order.
    ///
    /// # Errors
    /// Returns error if the order is rejected or the API call fails.
    pub async fn place_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> Result<OrderResult> {
        let symbol = Self::validate_symbol(symbol)?;
        let query = format!(
            "symbol={symbol}&side={}&type=MARKET&quantity={quantity}",
            side.as_api_str()
        );

        let ack: RawOrderAck = self.post_signed("/fapi/v1/order", &query).await?;

        Ok(OrderResult {
            order_id: Some(ack.order_id.to_string()),
            symbol: ack.symbol,
            side,
            quantity,
            simulated: false,
            timestamp: Utc::now(),
        })
    }
}
