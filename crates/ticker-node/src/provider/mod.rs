pub mod coinbase;
pub mod coincap;
pub mod coinmarketcap;
pub mod cryptocompare;
pub mod payload;
pub mod template;

use coin_ticker_common::{
    is_accepted, CryptoCurrency, CurrencyPair, FiatCurrency, Result, TickerError,
};
use reqwest::Url;
use serde_json::Value;

pub use coinbase::{CoinbaseOperation, CoinbaseProvider};
pub use coincap::CoinCapProvider;
pub use coinmarketcap::CoinMarketCapProvider;
pub use cryptocompare::CryptoCompareProvider;
pub use template::TemplateProvider;

/// One price source bound to one trading operation.
///
/// Implementors supply the URL shape and payload shape for a pair they
/// already know to be supported. Callers go through `build_request_url` and
/// `extract_price`, which reject unsupported pairs before either runs, so an
/// unsupported pair never shows up as bad data.
pub trait PriceProvider: Send + Sync {
    /// Stable display name, e.g. "Coinbase Buy"
    fn name(&self) -> &str;

    /// Currencies this provider quotes
    fn matrix(&self) -> &CurrencyMatrix;

    /// URL for a pair that passed the currency check
    fn request_url(&self, pair: CurrencyPair) -> Result<Url>;

    /// Price from a payload for a pair that passed the currency check
    fn read_price(&self, payload: &Value, pair: CurrencyPair) -> Result<f64>;

    fn accepted_cryptos(&self) -> &[CryptoCurrency] {
        self.matrix().cryptos()
    }

    fn accepted_fiats(&self) -> &[FiatCurrency] {
        self.matrix().fiats()
    }

    fn supports(&self, pair: CurrencyPair) -> bool {
        self.matrix().supports(pair)
    }

    fn build_request_url(&self, pair: CurrencyPair) -> Result<Url> {
        self.matrix().check(pair)?;
        self.request_url(pair)
    }

    fn extract_price(&self, payload: &Value, pair: CurrencyPair) -> Result<f64> {
        self.matrix().check(pair)?;
        self.read_price(payload, pair)
    }
}

/// Accepted crypto and fiat sets shared by providers and their state stores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyMatrix {
    cryptos: Vec<CryptoCurrency>,
    fiats: Vec<FiatCurrency>,
}

impl CurrencyMatrix {
    pub fn new(cryptos: &[CryptoCurrency], fiats: &[FiatCurrency]) -> Self {
        let mut matrix = Self {
            cryptos: Vec::with_capacity(cryptos.len()),
            fiats: Vec::with_capacity(fiats.len()),
        };
        for crypto in cryptos {
            if !is_accepted(&matrix.cryptos, crypto) {
                matrix.cryptos.push(*crypto);
            }
        }
        for fiat in fiats {
            if !is_accepted(&matrix.fiats, fiat) {
                matrix.fiats.push(*fiat);
            }
        }
        matrix
    }

    pub fn cryptos(&self) -> &[CryptoCurrency] {
        &self.cryptos
    }

    pub fn fiats(&self) -> &[FiatCurrency] {
        &self.fiats
    }

    pub fn supports(&self, pair: CurrencyPair) -> bool {
        is_accepted(&self.cryptos, &pair.crypto) && is_accepted(&self.fiats, &pair.fiat)
    }

    /// Crypto side is checked first, so it is the one reported when both fail
    pub fn check(&self, pair: CurrencyPair) -> Result<()> {
        if !is_accepted(&self.cryptos, &pair.crypto) {
            return Err(TickerError::CurrencyNotSupported(pair.crypto.into()));
        }
        if !is_accepted(&self.fiats, &pair.fiat) {
            return Err(TickerError::CurrencyNotSupported(pair.fiat.into()));
        }
        Ok(())
    }

    /// Every accepted crypto x fiat combination
    pub fn pairs(&self) -> impl Iterator<Item = CurrencyPair> + '_ {
        self.cryptos.iter().flat_map(move |crypto| {
            self.fiats
                .iter()
                .map(move |fiat| CurrencyPair::new(*crypto, *fiat))
        })
    }
}

/// Parse a static base URL, rejecting anything that cannot carry path segments
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| TickerError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(TickerError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {:?}", url.scheme()),
        });
    }
    if url.cannot_be_a_base() {
        return Err(TickerError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "URL cannot be a base".to_string(),
        });
    }

    Ok(url)
}

/// Append path segments to a base URL, replacing a trailing empty segment
pub(crate) fn with_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| TickerError::InvalidBaseUrl {
            url: base.to_string(),
            reason: "URL cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
