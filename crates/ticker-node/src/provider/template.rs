use super::{parse_base_url, payload, CurrencyMatrix, PriceProvider};
use coin_ticker_common::config::TemplateProviderConfig;
use coin_ticker_common::{CurrencyPair, Result, TickerError};
use reqwest::Url;
use serde_json::Value;

/// Provider whose URL and price location come from configuration.
///
/// Both the URL template and each `price_path` key may use the placeholders
/// `{crypto}`, `{crypto_lower}`, `{crypto_name}`, `{fiat}` and `{fiat_lower}`.
pub struct TemplateProvider {
    name: String,
    url_template: String,
    price_path: Vec<String>,
    matrix: CurrencyMatrix,
}

impl TemplateProvider {
    /// Fails if the template does not render to a valid URL for every
    /// accepted pair.
    pub fn new(config: &TemplateProviderConfig) -> Result<Self> {
        let provider = Self {
            name: config.name.clone(),
            url_template: config.url_template.clone(),
            price_path: config.price_path.clone(),
            matrix: CurrencyMatrix::new(&config.accepted_cryptos, &config.accepted_fiats),
        };

        if provider.matrix.pairs().next().is_none() {
            return Err(TickerError::InvalidConfig(format!(
                "template provider {:?} accepts no currency pairs",
                provider.name
            )));
        }
        for pair in provider.matrix.pairs() {
            parse_base_url(&render(&provider.url_template, pair))?;
        }

        Ok(provider)
    }
}

impl PriceProvider for TemplateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn matrix(&self) -> &CurrencyMatrix {
        &self.matrix
    }

    fn request_url(&self, pair: CurrencyPair) -> Result<Url> {
        parse_base_url(&render(&self.url_template, pair))
    }

    fn read_price(&self, payload: &Value, pair: CurrencyPair) -> Result<f64> {
        let path: Vec<String> = self.price_path.iter().map(|key| render(key, pair)).collect();
        payload::price_at(&self.name, payload, &path)
    }
}

fn render(template: &str, pair: CurrencyPair) -> String {
    template
        .replace("{crypto_lower}", &pair.crypto.code().to_lowercase())
        .replace("{crypto_name}", &pair.crypto.name().to_lowercase())
        .replace("{crypto}", pair.crypto.code())
        .replace("{fiat_lower}", &pair.fiat.code().to_lowercase())
        .replace("{fiat}", pair.fiat.code())
}
