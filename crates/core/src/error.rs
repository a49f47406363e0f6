//! Error types for risk-management decisions.
//!
//! One variant per failure kind the decision engine distinguishes. Upstream
//! detail is carried as a string so callers can log it with symbol context.

use thiserror::Error;

/// Errors produced by the decision engine.
#[derive(Debug, Error)]
pub enum RiskError {
    /// Exchange metadata could not be resolved for a symbol.
    #[error("metadata unavailable for {symbol}: {detail}")]
    MetadataUnavailable {
        /// Symbol the resolution was for.
        symbol: String,
        /// Upstream failure detail.
        detail: String,
    },

    /// No current price could be obtained for a symbol.
    #[error("price unavailable for {symbol}: {detail}")]
    PriceUnavailable {
        /// Symbol the lookup was for.
        symbol: String,
        /// Upstream failure detail.
        detail: String,
    },

    /// The account balance query failed.
    #[error("account query failed: {0}")]
    AccountQueryFailed(String),

    /// Order submission was rejected or failed upstream.
    #[error("order rejected for {symbol}: {detail}")]
    OrderRejected {
        /// Symbol the order was for.
        symbol: String,
        /// Rejection detail from the exchange.
        detail: String,
    },

    /// A position violated the evaluator's contract (zero leverage or
    /// zero amount).
    #[error("invalid position for {symbol}: {reason}")]
    InvalidPosition {
        /// Symbol of the offending position.
        symbol: String,
        /// What the contract violation was.
        reason: String,
    },
}

impl RiskError {
    /// Creates a metadata-unavailable error.
    pub fn metadata_unavailable(symbol: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MetadataUnavailable {
            symbol: symbol.into(),
            detail: detail.into(),
        }
    }

    /// Creates a price-unavailable error.
    pub fn price_unavailable(symbol: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::PriceUnavailable {
            symbol: symbol.into(),
            detail: detail.into(),
        }
    }

    /// Creates an order-rejected error.
    pub fn order_rejected(symbol: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::OrderRejected {
            symbol: symbol.into(),
            detail: detail.into(),
        }
    }

    /// Creates an invalid-position error.
    pub fn invalid_position(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPosition {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    /// Returns the symbol the error is about, if it carries one.
    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::MetadataUnavailable { symbol, .. }
            | Self::PriceUnavailable { symbol, .. }
            | Self::OrderRejected { symbol, .. }
            | Self::InvalidPosition { symbol, .. } => Some(symbol),
            Self::AccountQueryFailed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_unavailable_display() {
        let err = RiskError::metadata_unavailable("XRPUSDT", "listing call timed out");
        assert!(err.to_string().contains("XRPUSDT"));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_price_unavailable_display() {
        let err = RiskError::price_unavailable("DOGEUSDT", "symbol absent from feed");
        assert!(err.to_string().contains("DOGEUSDT"));
        assert!(err.to_string().contains("absent"));
    }

    #[test]
    fn test_invalid_position_display() {
        let err = RiskError::invalid_position("XRPUSDT", "zero leverage");
        assert!(err.to_string().contains("zero leverage"));
    }

    #[test]
    fn test_symbol_accessor() {
        assert_eq!(
            RiskError::order_rejected("XRPUSDT", "margin").symbol(),
            Some("XRPUSDT")
        );
        assert_eq!(
            RiskError::AccountQueryFailed("boom".to_string()).symbol(),
            None
        );
    }
}
