use super::{parse_base_url, payload, with_segments, CurrencyMatrix, PriceProvider};
use coin_ticker_common::{CryptoCurrency, CurrencyPair, FiatCurrency, Result};
use reqwest::Url;
use serde_json::Value;

/// Coinbase prices API
pub const COINBASE_API_URL: &str = "https://api.coinbase.com/v2/prices/";

const ACCEPTED_CRYPTOS: [CryptoCurrency; 4] = [
    CryptoCurrency::BTC,
    CryptoCurrency::ETH,
    CryptoCurrency::LTC,
    CryptoCurrency::XRP,
];

const ACCEPTED_FIATS: [FiatCurrency; 9] = [
    FiatCurrency::AUD,
    FiatCurrency::CAD,
    FiatCurrency::EUR,
    FiatCurrency::JPY,
    FiatCurrency::MXN,
    FiatCurrency::NZD,
    FiatCurrency::PLN,
    FiatCurrency::SEK,
    FiatCurrency::USD,
];

/// The Coinbase price endpoints differ only in their last path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinbaseOperation {
    Buy,
    Sell,
    Spot,
}

impl CoinbaseOperation {
    fn path(&self) -> &'static str {
        match self {
            CoinbaseOperation::Buy => "buy",
            CoinbaseOperation::Sell => "sell",
            CoinbaseOperation::Spot => "spot",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            CoinbaseOperation::Buy => "Buy",
            CoinbaseOperation::Sell => "Sell",
            CoinbaseOperation::Spot => "Spot",
        }
    }
}

/// Coinbase buy/sell/spot price for a pair.
///
/// Response shape: `{"data": {"base": "BTC", "currency": "USD", "amount": "50000.25"}}`
pub struct CoinbaseProvider {
    name: String,
    operation: CoinbaseOperation,
    base_url: Url,
    matrix: CurrencyMatrix,
}

impl CoinbaseProvider {
    pub fn new(operation: CoinbaseOperation) -> Result<Self> {
        Self::with_base_url(operation, COINBASE_API_URL)
    }

    pub fn with_base_url(operation: CoinbaseOperation, base_url: &str) -> Result<Self> {
        Ok(Self {
            name: format!("Coinbase {}", operation.label()),
            operation,
            base_url: parse_base_url(base_url)?,
            matrix: CurrencyMatrix::new(&ACCEPTED_CRYPTOS, &ACCEPTED_FIATS),
        })
    }

    pub fn operation(&self) -> CoinbaseOperation {
        self.operation
    }
}

impl PriceProvider for CoinbaseProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn matrix(&self) -> &CurrencyMatrix {
        &self.matrix
    }

    fn request_url(&self, pair: CurrencyPair) -> Result<Url> {
        let product = format!("{}-{}", pair.crypto.code(), pair.fiat.code());
        with_segments(&self.base_url, &[product.as_str(), self.operation.path()])
    }

    fn read_price(&self, payload: &Value, _pair: CurrencyPair) -> Result<f64> {
        payload::price_at(&self.name, payload, &["data", "amount"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coin_ticker_common::TickerError;
    use serde_json::json;

    #[test]
    fn test_coinbase_provider_names() {
        assert_eq!(CoinbaseProvider::new(CoinbaseOperation::Buy).unwrap().name(), "Coinbase Buy");
        assert_eq!(CoinbaseProvider::new(CoinbaseOperation::Sell).unwrap().name(), "Coinbase Sell");
        assert_eq!(CoinbaseProvider::new(CoinbaseOperation::Spot).unwrap().name(), "Coinbase Spot");
    }

    #[test]
    fn test_request_urls() {
        let buy = CoinbaseProvider::new(CoinbaseOperation::Buy).unwrap();
        let url = buy
            .build_request_url(CurrencyPair::new(CryptoCurrency::LTC, FiatCurrency::USD))
            .unwrap();
        assert_eq!(url.as_str(), "https://api.coinbase.com/v2/prices/LTC-USD/buy");

        let spot = CoinbaseProvider::new(CoinbaseOperation::Spot).unwrap();
        let url = spot
            .build_request_url(CurrencyPair::new(CryptoCurrency::ETH, FiatCurrency::EUR))
            .unwrap();
        assert_eq!(url.as_str(), "https://api.coinbase.com/v2/prices/ETH-EUR/spot");
    }

    #[test]
    fn test_gbp_is_not_supported() {
        let sell = CoinbaseProvider::new(CoinbaseOperation::Sell).unwrap();
        let pair = CurrencyPair::new(CryptoCurrency::BTC, FiatCurrency::GBP);
        assert!(!sell.supports(pair));
        assert!(matches!(
            sell.build_request_url(pair),
            Err(TickerError::CurrencyNotSupported(_))
        ));
    }

    #[test]
    fn test_extract_amount() {
        let provider = CoinbaseProvider::new(CoinbaseOperation::Spot).unwrap();
        let payload = json!({"data": {"base": "BTC", "currency": "USD", "amount": "64123.01"}});
        let price = provider
            .extract_price(&payload, CurrencyPair::btc_usd())
            .unwrap();
        assert_eq!(price, 64123.01);
    }

    #[test]
    fn test_unsupported_pair_is_not_bad_data() {
        let provider = CoinbaseProvider::new(CoinbaseOperation::Spot).unwrap();
        let err = provider
            .extract_price(&json!("garbage"), CurrencyPair::new(CryptoCurrency::BCH, FiatCurrency::USD))
            .unwrap_err();
        assert!(err.is_currency_not_supported());
    }

    #[test]
    fn test_invalid_base_url_rejected_at_construction() {
        assert!(matches!(
            CoinbaseProvider::with_base_url(CoinbaseOperation::Buy, "::not-a-url"),
            Err(TickerError::InvalidBaseUrl { .. })
        ));
    }
}
