use super::{parse_base_url, payload, CurrencyMatrix, PriceProvider};
use coin_ticker_common::{CryptoCurrency, CurrencyPair, FiatCurrency, Result};
use reqwest::Url;
use serde_json::Value;

pub const COINMARKETCAP_API_URL: &str =
    "https://pro-api.coinmarketcap.com/v1/cryptocurrency/quotes/latest";

const ACCEPTED_CRYPTOS: [CryptoCurrency; 4] = [
    CryptoCurrency::BTC,
    CryptoCurrency::ETH,
    CryptoCurrency::LTC,
    CryptoCurrency::XRP,
];

const ACCEPTED_FIATS: [FiatCurrency; 10] = [
    FiatCurrency::AUD,
    FiatCurrency::CAD,
    FiatCurrency::EUR,
    FiatCurrency::GBP,
    FiatCurrency::JPY,
    FiatCurrency::MXN,
    FiatCurrency::NZD,
    FiatCurrency::PLN,
    FiatCurrency::SEK,
    FiatCurrency::USD,
];

/// CoinMarketCap latest quotes. The pro API wants an API key, so the
/// provider is off in the default configuration.
///
/// Response shape: `{"data": {"quotes": {"USD": {"price": 50000.25}}}}`
pub struct CoinMarketCapProvider {
    base_url: Url,
    matrix: CurrencyMatrix,
}

impl CoinMarketCapProvider {
    pub fn new() -> Result<Self> {
        Self::with_base_url(COINMARKETCAP_API_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            matrix: CurrencyMatrix::new(&ACCEPTED_CRYPTOS, &ACCEPTED_FIATS),
        })
    }
}

impl PriceProvider for CoinMarketCapProvider {
    fn name(&self) -> &str {
        "CoinMarketCap"
    }

    fn matrix(&self) -> &CurrencyMatrix {
        &self.matrix
    }

    fn request_url(&self, pair: CurrencyPair) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("symbol", pair.crypto.code())
            .append_pair("convert", pair.fiat.code());
        Ok(url)
    }

    fn read_price(&self, payload: &Value, pair: CurrencyPair) -> Result<f64> {
        payload::price_at(
            self.name(),
            payload,
            &["data", "quotes", pair.fiat.code(), "price"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coin_ticker_common::TickerError;
    use serde_json::json;

    #[test]
    fn test_query_url() {
        let provider = CoinMarketCapProvider::new().unwrap();
        let url = provider
            .build_request_url(CurrencyPair::new(CryptoCurrency::XRP, FiatCurrency::GBP))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://pro-api.coinmarketcap.com/v1/cryptocurrency/quotes/latest?symbol=XRP&convert=GBP"
        );
    }

    #[test]
    fn test_extracts_quote_for_selected_fiat() {
        let provider = CoinMarketCapProvider::new().unwrap();
        let payload = json!({
            "data": {"quotes": {
                "USD": {"price": 50000.25},
                "EUR": {"price": 46000.5}
            }}
        });
        let pair = CurrencyPair::new(CryptoCurrency::BTC, FiatCurrency::EUR);
        assert_eq!(provider.extract_price(&payload, pair).unwrap(), 46000.5);
    }

    #[test]
    fn test_missing_fiat_quote_is_bad_data() {
        let provider = CoinMarketCapProvider::new().unwrap();
        let payload = json!({"data": {"quotes": {"USD": {"price": 50000.25}}}});
        let pair = CurrencyPair::new(CryptoCurrency::BTC, FiatCurrency::SEK);
        assert!(matches!(
            provider.extract_price(&payload, pair),
            Err(TickerError::BadData { .. })
        ));
    }
}
