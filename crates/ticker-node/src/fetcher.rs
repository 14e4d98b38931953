use async_trait::async_trait;
use coin_ticker_common::config::TickerConfig;
use coin_ticker_common::{Result, TickerError};
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Network collaborator: GET a URL and hand back the decoded body
#[async_trait]
pub trait PayloadFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Value>;
}

/// reqwest-backed fetcher. No retries; a failed request is reported once.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TickerError::InvalidConfig(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    pub fn from_config(config: &TickerConfig) -> Result<Self> {
        Self::new(
            &config.user_agent,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }
}

#[async_trait]
impl PayloadFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Value> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TickerError::Transport(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TickerError::Transport(format!(
                "{url} returned error status {status}"
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| TickerError::Transport(format!("undecodable body from {url}: {e}")))
    }
}
