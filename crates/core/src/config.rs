use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub binance: BinanceConfig,
    pub trading: TradingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BinanceConfig {
    pub api_url: String,
    pub requests_per_minute: u32,
    pub timeout_secs: u64,
    pub recv_window_ms: u64,
}

/// Watchlist and risk parameters.
///
/// The defaults are the fixed policy values: 20x leverage, 20% of balance
/// per open, reversal below -10% ROE at double size. Simulation defaults on
/// so a bare config never trades live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    pub watchlist: Vec<String>,
    pub simulation: bool,
    pub leverage: u32,
    pub risk_fraction: Decimal,
    pub reversal_roe_threshold: Decimal,
    pub reversal_size_multiplier: Decimal,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            binance: BinanceConfig::default(),
            trading: TradingConfig::default(),
        }
    }
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            api_url: "https://fapi.binance.com".to_string(),
            requests_per_minute: 1200,
            timeout_secs: 30,
            recv_window_ms: 5000,
        }
    }
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            watchlist: Vec::new(),
            simulation: true,
            leverage: 20,
            risk_fraction: Decimal::new(2, 1),
            reversal_roe_threshold: Decimal::from(-10),
            reversal_size_multiplier: Decimal::from(2),
        }
    }
}
