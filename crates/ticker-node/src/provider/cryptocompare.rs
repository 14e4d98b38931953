use super::{parse_base_url, payload, CurrencyMatrix, PriceProvider};
use coin_ticker_common::{CryptoCurrency, CurrencyPair, FiatCurrency, Result};
use reqwest::Url;
use serde_json::Value;

pub const CRYPTOCOMPARE_API_URL: &str = "https://min-api.cryptocompare.com/data/price";

const ACCEPTED_CRYPTOS: [CryptoCurrency; 5] = [
    CryptoCurrency::BTC,
    CryptoCurrency::ETH,
    CryptoCurrency::LTC,
    CryptoCurrency::XRP,
    CryptoCurrency::BCH,
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

/// CryptoCompare single-symbol price, e.g. `{"USD": 50000.25}`
pub struct CryptoCompareProvider {
    base_url: Url,
    matrix: CurrencyMatrix,
}

impl CryptoCompareProvider {
    pub fn new() -> Result<Self> {
        Self::with_base_url(CRYPTOCOMPARE_API_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            matrix: CurrencyMatrix::new(&ACCEPTED_CRYPTOS, &ACCEPTED_FIATS),
        })
    }
}

impl PriceProvider for CryptoCompareProvider {
    fn name(&self) -> &str {
        "CryptoCompare"
    }

    fn matrix(&self) -> &CurrencyMatrix {
        &self.matrix
    }

    fn request_url(&self, pair: CurrencyPair) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("fsym", pair.crypto.code())
            .append_pair("tsyms", pair.fiat.code());
        Ok(url)
    }

    fn read_price(&self, payload: &Value, pair: CurrencyPair) -> Result<f64> {
        payload::price_at(self.name(), payload, &[pair.fiat.code()])
    }
}
