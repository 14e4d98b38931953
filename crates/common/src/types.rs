use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TickerError;

/// Cryptocurrencies known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum CryptoCurrency {
    BTC,
    ETH,
    LTC,
    XRP,
    BCH,
}

impl CryptoCurrency {
    pub const ALL: [CryptoCurrency; 5] = [
        CryptoCurrency::BTC,
        CryptoCurrency::ETH,
        CryptoCurrency::LTC,
        CryptoCurrency::XRP,
        CryptoCurrency::BCH,
    ];

    /// Abbreviated ticker symbol, e.g. "BTC"
    pub fn code(&self) -> &'static str {
        match self {
            CryptoCurrency::BTC => "BTC",
            CryptoCurrency::ETH => "ETH",
            CryptoCurrency::LTC => "LTC",
            CryptoCurrency::XRP => "XRP",
            CryptoCurrency::BCH => "BCH",
        }
    }

    /// Human-readable name, e.g. "Bitcoin"
    pub fn name(&self) -> &'static str {
        match self {
            CryptoCurrency::BTC => "Bitcoin",
            CryptoCurrency::ETH => "Ethereum",
            CryptoCurrency::LTC => "Litecoin",
            CryptoCurrency::XRP => "XRP",
            CryptoCurrency::BCH => "Bitcoin Cash",
        }
    }
}

impl fmt::Display for CryptoCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CryptoCurrency {
    type Err = TickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CryptoCurrency::ALL
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TickerError::UnknownCurrency(s.to_string()))
    }
}

impl TryFrom<String> for CryptoCurrency {
    type Error = TickerError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}

/// Fiat currencies known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum FiatCurrency {
    AUD,
    CAD,
    EUR,
    GBP,
    JPY,
    MXN,
    NZD,
    PLN,
    SEK,
    USD,
}

impl FiatCurrency {
    pub const ALL: [FiatCurrency; 10] = [
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

    pub fn code(&self) -> &'static str {
        match self {
            FiatCurrency::AUD => "AUD",
            FiatCurrency::CAD => "CAD",
            FiatCurrency::EUR => "EUR",
            FiatCurrency::GBP => "GBP",
            FiatCurrency::JPY => "JPY",
            FiatCurrency::MXN => "MXN",
            FiatCurrency::NZD => "NZD",
            FiatCurrency::PLN => "PLN",
            FiatCurrency::SEK => "SEK",
            FiatCurrency::USD => "USD",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FiatCurrency::AUD => "Australian Dollar",
            FiatCurrency::CAD => "Canadian Dollar",
            FiatCurrency::EUR => "Euro",
            FiatCurrency::GBP => "British Pound",
            FiatCurrency::JPY => "Japanese Yen",
            FiatCurrency::MXN => "Mexican Peso",
            FiatCurrency::NZD => "New Zealand Dollar",
            FiatCurrency::PLN => "Polish Zloty",
            FiatCurrency::SEK => "Swedish Krona",
            FiatCurrency::USD => "US Dollar",
        }
    }
}

impl fmt::Display for FiatCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FiatCurrency {
    type Err = TickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FiatCurrency::ALL
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TickerError::UnknownCurrency(s.to_string()))
    }
}

impl TryFrom<String> for FiatCurrency {
    type Error = TickerError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}

/// Which half of a pair a currency belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencySide {
    Crypto,
    Fiat,
}

impl fmt::Display for CurrencySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrencySide::Crypto => f.write_str("cryptocurrency"),
            CurrencySide::Fiat => f.write_str("fiat currency"),
        }
    }
}

/// A currency from either side of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Crypto(CryptoCurrency),
    Fiat(FiatCurrency),
}

impl Currency {
    pub fn side(&self) -> CurrencySide {
        match self {
            Currency::Crypto(_) => CurrencySide::Crypto,
            Currency::Fiat(_) => CurrencySide::Fiat,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Crypto(c) => c.code(),
            Currency::Fiat(f) => f.code(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Currency::Crypto(c) => c.name(),
            Currency::Fiat(f) => f.name(),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.side(), self.code())
    }
}

impl From<CryptoCurrency> for Currency {
    fn from(c: CryptoCurrency) -> Self {
        Currency::Crypto(c)
    }
}

impl From<FiatCurrency> for Currency {
    fn from(f: FiatCurrency) -> Self {
        Currency::Fiat(f)
    }
}

/// (crypto, fiat) pair, compared structurally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub crypto: CryptoCurrency,
    pub fiat: FiatCurrency,
}

impl CurrencyPair {
    pub fn new(crypto: CryptoCurrency, fiat: FiatCurrency) -> Self {
        Self { crypto, fiat }
    }

    pub fn btc_usd() -> Self {
        Self::new(CryptoCurrency::BTC, FiatCurrency::USD)
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.crypto, self.fiat)
    }
}

/// Membership test over a small accepted set
pub fn is_accepted<C: PartialEq>(set: &[C], candidate: &C) -> bool {
    set.iter().any(|c| c == candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_codes_and_names() {
        assert_eq!(CryptoCurrency::BTC.code(), "BTC");
        assert_eq!(CryptoCurrency::BTC.name(), "Bitcoin");
        assert_eq!(FiatCurrency::EUR.code(), "EUR");
        assert_eq!(FiatCurrency::USD.name(), "US Dollar");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("eth".parse::<CryptoCurrency>().unwrap(), CryptoCurrency::ETH);
        assert_eq!(" Usd ".parse::<FiatCurrency>().unwrap(), FiatCurrency::USD);
        assert!(matches!(
            "DOGE".parse::<CryptoCurrency>(),
            Err(TickerError::UnknownCurrency(code)) if code == "DOGE"
        ));
    }

    #[test]
    fn test_pair_is_a_structural_map_key() {
        let mut map = HashMap::new();
        map.insert(CurrencyPair::new(CryptoCurrency::BTC, FiatCurrency::USD), 1);

        assert_eq!(map.get(&CurrencyPair::btc_usd()), Some(&1));
        assert_eq!(
            map.get(&CurrencyPair::new(CryptoCurrency::BTC, FiatCurrency::EUR)),
            None
        );
        assert_eq!(CurrencyPair::btc_usd().to_string(), "BTC/USD");
    }

    #[test]
    fn test_is_accepted() {
        let set = [CryptoCurrency::BTC, CryptoCurrency::ETH];
        assert!(is_accepted(&set, &CryptoCurrency::ETH));
        assert!(!is_accepted(&set, &CryptoCurrency::XRP));
        assert!(!is_accepted::<FiatCurrency>(&[], &FiatCurrency::USD));
    }

    #[test]
    fn test_currency_side_display() {
        let fiat: Currency = FiatCurrency::EUR.into();
        assert_eq!(fiat.side(), CurrencySide::Fiat);
        assert_eq!(fiat.to_string(), "fiat currency EUR");
        assert_eq!(Currency::from(CryptoCurrency::LTC).to_string(), "cryptocurrency LTC");
    }
}
