use thiserror::Error;

use crate::types::{Currency, CurrencySide};

/// Errors raised by providers, the pair state store and the refresh controller
#[derive(Debug, Error)]
pub enum TickerError {
    /// The currency is outside a provider's accepted set
    #[error("{0} is not supported")]
    CurrencyNotSupported(Currency),

    /// Payload did not have the shape the provider expects
    #[error("bad data from {provider}: {cause}")]
    BadData { provider: String, cause: String },

    /// The network fetch could not complete
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TickerError {
    pub fn bad_data(provider: &str, cause: impl std::fmt::Display) -> Self {
        TickerError::BadData {
            provider: provider.to_string(),
            cause: cause.to_string(),
        }
    }

    /// Side rejected by a `CurrencyNotSupported` error
    pub fn unsupported_side(&self) -> Option<CurrencySide> {
        match self {
            TickerError::CurrencyNotSupported(currency) => Some(currency.side()),
            _ => None,
        }
    }

    pub fn is_currency_not_supported(&self) -> bool {
        matches!(self, TickerError::CurrencyNotSupported(_))
    }
}

pub type Result<T> = std::result::Result<T, TickerError>;
