use super::{parse_base_url, payload, with_segments, CurrencyMatrix, PriceProvider};
use coin_ticker_common::{CryptoCurrency, CurrencyPair, FiatCurrency, Result};
use reqwest::Url;
use serde_json::Value;

pub const COINCAP_API_URL: &str = "https://api.coincap.io/v2/rates/";

const ACCEPTED_CRYPTOS: [CryptoCurrency; 4] = [
    CryptoCurrency::BTC,
    CryptoCurrency::ETH,
    CryptoCurrency::LTC,
    CryptoCurrency::XRP,
];

/// CoinCap only publishes USD rates
const ACCEPTED_FIATS: [FiatCurrency; 1] = [FiatCurrency::USD];

/// CoinCap rate endpoint, keyed by the lowercase asset name.
///
/// Response shape: `{"data": {"id": "bitcoin", "rateUsd": "50000.25"}}`
pub struct CoinCapProvider {
    base_url: Url,
    matrix: CurrencyMatrix,
}

impl CoinCapProvider {
    pub fn new() -> Result<Self> {
        Self::with_base_url(COINCAP_API_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            matrix: CurrencyMatrix::new(&ACCEPTED_CRYPTOS, &ACCEPTED_FIATS),
        })
    }
}

impl PriceProvider for CoinCapProvider {
    fn name(&self) -> &str {
        "CoinCap"
    }

    fn matrix(&self) -> &CurrencyMatrix {
        &self.matrix
    }

    fn request_url(&self, pair: CurrencyPair) -> Result<Url> {
        let asset = pair.crypto.name().to_lowercase();
        with_segments(&self.base_url, &[asset.as_str()])
    }

    fn read_price(&self, payload: &Value, _pair: CurrencyPair) -> Result<f64> {
        payload::price_at(self.name(), payload, &["data", "rateUsd"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coin_ticker_common::{Currency, TickerError};
    use serde_json::json;

    #[test]
    fn test_coincap_url_uses_lowercase_name() {
        let provider = CoinCapProvider::new().unwrap();
        let url = provider.build_request_url(CurrencyPair::btc_usd()).unwrap();
        assert_eq!(url.as_str(), "https://api.coincap.io/v2/rates/bitcoin");

        let url = provider
            .build_request_url(CurrencyPair::new(CryptoCurrency::ETH, FiatCurrency::USD))
            .unwrap();
        assert_eq!(url.as_str(), "https://api.coincap.io/v2/rates/ethereum");
    }

    #[test]
    fn test_coincap_rejects_eur() {
        let provider = CoinCapProvider::new().unwrap();
        let err = provider
            .build_request_url(CurrencyPair::new(CryptoCurrency::BTC, FiatCurrency::EUR))
            .unwrap_err();
        assert!(matches!(
            err,
            TickerError::CurrencyNotSupported(Currency::Fiat(FiatCurrency::EUR))
        ));
    }

    #[test]
    fn test_coincap_extracts_rate_usd() {
        let provider = CoinCapProvider::new().unwrap();
        let payload = json!({"data": {"rateUsd": "50000.25"}});
        assert_eq!(
            provider.extract_price(&payload, CurrencyPair::btc_usd()).unwrap(),
            50000.25
        );
    }

    #[test]
    fn test_coincap_bad_payloads() {
        let provider = CoinCapProvider::new().unwrap();
        for payload in [
            json!({}),
            json!({"data": null}),
            json!({"data": {"rateUsd": "fifty thousand"}}),
            json!({"data": {"rateUsd": []}}),
        ] {
            let err = provider
                .extract_price(&payload, CurrencyPair::btc_usd())
                .unwrap_err();
            assert!(matches!(err, TickerError::BadData { .. }), "payload {payload}");
        }
    }
}
