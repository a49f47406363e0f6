pub mod config;
pub mod config_loader;
pub mod error;
pub mod roe;
pub mod sizing;
pub mod traits;
pub mod types;

pub use config::{AppConfig, BinanceConfig, TradingConfig};
pub use config_loader::ConfigLoader;
pub use error::RiskError;
pub use roe::roe;
pub use sizing::{order_quantity, risk_amount};
pub use traits::{ExchangeApi, OrderGateway};
pub use types::{AccountSnapshot, AssetInfo, OrderRequest, OrderResult, Position, Side};
