pub mod auth;
pub mod capability;
pub mod client;
pub mod error;
mod types;

pub use auth::{BinanceAuth, BinanceAuthConfig};
pub use client::{BinanceClient, BinanceClientConfig, FAPI_PROD_URL, FAPI_TESTNET_URL};
pub use error::BinanceError;
