//! HMAC-SHA256 authentication for the Binance futures API.
//!
//! Signed endpoints require the request's query string to be signed with the
//! account's API secret; the hex-encoded signature is appended as the
//! `signature` parameter and the API key travels in the `X-MBX-APIKEY`
//! header.
//!
//! # Security
//!
//! - Credentials are loaded from environment variables
//! - The secret is held in a [`secrecy::SecretString`] and never logged

use crate::error::{BinanceError, Result};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for Binance authentication.
#[derive(Debug, Clone)]
pub struct BinanceAuthConfig {
    /// Environment variable name for the API key.
    pub api_key_env: String,

    /// Environment variable name for the API secret.
    pub api_secret_env: String,
}

impl Default for BinanceAuthConfig {
    fn default() -> Self {
        Self {
            api_key_env: "BINANCE_API_KEY".to_string(),
            api_secret_env: "BINANCE_API_SECRET".to_string(),
        }
    }
}

impl BinanceAuthConfig {
    /// Sets custom environment variable names.
    #[must_use]
    pub fn with_env_vars(
        mut self,
        api_key_env: impl Into<String>,
        api_secret_env: impl Into<String>,
    ) -> Self {
        self.api_key_env = api_key_env.into();
        self.api_secret_env = api_secret_env.into();
        self
    }
}

// =============================================================================
// Authentication handler
// =============================================================================

/// Holds credentials and signs query strings.
pub struct BinanceAuth {
    api_key: String,
    api_secret: SecretString,
}

impl std::fmt::Debug for BinanceAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceAuth").finish_non_exhaustive()
    }
}

impl BinanceAuth {
    /// Loads credentials from the environment variables named in `config`.
    ///
    /// # Errors
    /// Returns an error if either variable is unset or empty.
    pub fn from_env(config: &BinanceAuthConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            BinanceError::Authentication(format!("{} is not set", config.api_key_env))
        })?;
        let api_secret = std::env::var(&config.api_secret_env).map_err(|_| {
            BinanceError::Authentication(format!("{} is not set", config.api_secret_env))
        })?;

        if api_key.is_empty() || api_secret.is_empty() {
            return Err(BinanceError::Authentication(
                "API credentials are empty".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            api_secret: SecretString::from(api_secret),
        })
    }

    /// Returns the API key for the `X-MBX-APIKEY` header.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Signs a query string, returning the hex-encoded signature.
    ///
    /// # Errors
    /// Returns an error if the HMAC cannot be keyed.
    pub fn sign(&self, query: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.expose_secret().as_bytes())
            .map_err(|e| BinanceError::Authentication(format!("unusable API secret: {e}")))?;
        mac.update(query.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}
