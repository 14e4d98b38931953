//! Builds the provider list from configuration

use coin_ticker_common::config::TickerConfig;
use coin_ticker_common::{Result, TickerError};
use tracing::info;

use crate::provider::{
    CoinCapProvider, CoinMarketCapProvider, CoinbaseOperation, CoinbaseProvider,
    CryptoCompareProvider, PriceProvider, TemplateProvider,
};

/// Construct a built-in provider by its display name
pub fn builtin_provider(name: &str) -> Result<Box<dyn PriceProvider>> {
    let provider: Box<dyn PriceProvider> = match name {
        "Coinbase Buy" => Box::new(CoinbaseProvider::new(CoinbaseOperation::Buy)?),
        "Coinbase Sell" => Box::new(CoinbaseProvider::new(CoinbaseOperation::Sell)?),
        "Coinbase Spot" => Box::new(CoinbaseProvider::new(CoinbaseOperation::Spot)?),
        "CoinCap" => Box::new(CoinCapProvider::new()?),
        "CoinMarketCap" => Box::new(CoinMarketCapProvider::new()?),
        "CryptoCompare" => Box::new(CryptoCompareProvider::new()?),
        other => return Err(TickerError::UnknownProvider(other.to_string())),
    };
    Ok(provider)
}

/// Enabled built-ins in config order, then template providers
pub fn build_providers(config: &TickerConfig) -> Result<Vec<Box<dyn PriceProvider>>> {
    let mut providers = Vec::with_capacity(config.providers.len() + config.template_providers.len());

    for name in &config.providers {
        providers.push(builtin_provider(name)?);
    }
    for template in &config.template_providers {
        providers.push(Box::new(TemplateProvider::new(template)?) as Box<dyn PriceProvider>);
    }

    info!("Registered {} price provider(s)", providers.len());
    Ok(providers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coin_ticker_common::config::{TemplateProviderConfig, BUILTIN_PROVIDERS};
    use coin_ticker_common::{CryptoCurrency, FiatCurrency};

    #[test]
    fn test_every_builtin_name_constructs() {
        for name in BUILTIN_PROVIDERS {
            let provider = builtin_provider(name).unwrap();
            assert_eq!(provider.name(), name);
        }
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(matches!(
            builtin_provider("Mt. Gox"),
            Err(TickerError::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_default_config_registers_five() {
        let providers = build_providers(&TickerConfig::default()).unwrap();
        let names: Vec<_> = providers.iter().map(|p| p.name().to_string()).collect();
        assert_eq!(
            names,
            vec!["Coinbase Buy", "Coinbase Sell", "Coinbase Spot", "CoinCap", "CryptoCompare"]
        );
    }

    #[test]
    fn test_template_providers_appended() {
        let config = TickerConfig {
            providers: vec!["CoinCap".to_string()],
            template_providers: vec![TemplateProviderConfig {
                name: "Bitstamp".to_string(),
                url_template: "https://www.bitstamp.net/api/v2/ticker/{crypto_lower}{fiat_lower}/".to_string(),
                price_path: vec!["last".to_string()],
                accepted_cryptos: vec![CryptoCurrency::BTC],
                accepted_fiats: vec![FiatCurrency::USD, FiatCurrency::EUR],
            }],
            ..TickerConfig::default()
        };
        let providers = build_providers(&config).unwrap();
        assert_eq!(providers.len(), 2);
        assert_eq!(providers[1].name(), "Bitstamp");
    }
}
