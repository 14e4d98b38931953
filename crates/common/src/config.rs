//! TOML configuration for the ticker node

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Result, TickerError};
use crate::types::{CryptoCurrency, CurrencyPair, FiatCurrency};

/// Names of the providers compiled into the node
pub const BUILTIN_PROVIDERS: [&str; 6] = [
    "Coinbase Buy",
    "Coinbase Sell",
    "Coinbase Spot",
    "CoinCap",
    "CoinMarketCap",
    "CryptoCompare",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    pub default_crypto: CryptoCurrency,
    pub default_fiat: FiatCurrency,
    /// Seconds between refresh cycles in daemon mode
    pub refresh_interval_secs: u64,
    /// Per-request timeout; no timeout when unset
    pub request_timeout_secs: Option<u64>,
    pub user_agent: String,
    pub max_concurrent_fetches: usize,
    /// Built-in providers to register, by name
    pub providers: Vec<String>,
    pub template_providers: Vec<TemplateProviderConfig>,
}

/// A provider described entirely by configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateProviderConfig {
    pub name: String,
    /// e.g. "https://api.example.com/price/{crypto}-{fiat}"
    pub url_template: String,
    /// Keys leading to the price, e.g. ["data", "{fiat}", "last"]
    pub price_path: Vec<String>,
    pub accepted_cryptos: Vec<CryptoCurrency>,
    pub accepted_fiats: Vec<FiatCurrency>,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            default_crypto: CryptoCurrency::BTC,
            default_fiat: FiatCurrency::USD,
            refresh_interval_secs: 60,
            request_timeout_secs: None,
            user_agent: "CoinTicker/1.0".to_string(),
            max_concurrent_fetches: 16,
            providers: vec![
                "Coinbase Buy".to_string(),
                "Coinbase Sell".to_string(),
                "Coinbase Spot".to_string(),
                "CoinCap".to_string(),
                "CryptoCompare".to_string(),
            ],
            template_providers: Vec::new(),
        }
    }
}

impl TickerConfig {
    /// Read and validate a config file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to load config file {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: TickerConfig =
            toml::from_str(raw).map_err(|e| TickerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.default_crypto, self.default_fiat)
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_secs == 0 {
            return Err(TickerError::InvalidConfig(
                "refresh_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(TickerError::InvalidConfig(
                "max_concurrent_fetches must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(TickerError::InvalidConfig(
                "request_timeout_secs must be greater than zero when set".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for name in &self.providers {
            if !BUILTIN_PROVIDERS.contains(&name.as_str()) {
                return Err(TickerError::UnknownProvider(name.clone()));
            }
            if !names.insert(name.as_str()) {
                return Err(TickerError::InvalidConfig(format!(
                    "provider {name:?} listed twice"
                )));
            }
        }

        for template in &self.template_providers {
            if template.name.trim().is_empty() {
                return Err(TickerError::InvalidConfig(
                    "template provider name must not be empty".to_string(),
                ));
            }
            if !names.insert(template.name.as_str()) {
                return Err(TickerError::InvalidConfig(format!(
                    "provider {:?} defined twice",
                    template.name
                )));
            }
            if template.accepted_cryptos.is_empty() || template.accepted_fiats.is_empty() {
                return Err(TickerError::InvalidConfig(format!(
                    "template provider {:?} accepts no currency pairs",
                    template.name
                )));
            }
            if template.price_path.is_empty() {
                return Err(TickerError::InvalidConfig(format!(
                    "template provider {:?} has an empty price_path",
                    template.name
                )));
            }
        }

        Ok(())
    }
}
