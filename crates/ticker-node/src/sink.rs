//! Presentation sink boundary: where refresh results end up

use chrono::{DateTime, Utc};
use coin_ticker_common::CurrencyPair;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::memory::PairState;

/// A price notification for one provider and pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceUpdate {
    pub provider: String,
    pub pair: CurrencyPair,
    /// `None` until the pair has been fetched successfully
    pub price: Option<f64>,
    pub success: bool,
    pub last_updated: DateTime<Utc>,
}

impl PriceUpdate {
    pub fn from_state(provider: &str, pair: CurrencyPair, state: &PairState) -> Self {
        Self {
            provider: provider.to_string(),
            pair,
            price: state.display_price(),
            success: state.was_last_update_successful,
            last_updated: state.last_successful_update,
        }
    }
}

/// Receives state changes for the currently selected pair
pub trait PresentationSink: Send + Sync {
    fn notify_updating(&self, provider: &str, pair: CurrencyPair);

    fn notify_price_set(&self, update: &PriceUpdate);
}

/// Renders notifications as log lines
#[derive(Debug, Default)]
pub struct LoggingSink;

impl PresentationSink for LoggingSink {
    fn notify_updating(&self, provider: &str, pair: CurrencyPair) {
        info!("🔄 {} refreshing {}", provider, pair);
    }

    fn notify_price_set(&self, update: &PriceUpdate) {
        match (update.price, update.success) {
            (Some(price), true) => info!(
                "✅ {} {}: {:.2} (updated {})",
                update.provider,
                update.pair,
                price,
                update.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            (Some(price), false) => warn!(
                "⚠️  {} {}: {:.2} is stale, last good update {}",
                update.provider,
                update.pair,
                price,
                update.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            (None, _) => warn!("❌ {} {}: no price", update.provider, update.pair),
        }
    }
}

/// Notification as delivered through a `ChannelSink`
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Updating { provider: String, pair: CurrencyPair },
    PriceSet(PriceUpdate),
}

/// Forwards notifications into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SinkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PresentationSink for ChannelSink {
    fn notify_updating(&self, provider: &str, pair: CurrencyPair) {
        // receiver gone means nobody is displaying anything
        let _ = self.tx.send(SinkEvent::Updating {
            provider: provider.to_string(),
            pair,
        });
    }

    fn notify_price_set(&self, update: &PriceUpdate) {
        let _ = self.tx.send(SinkEvent::PriceSet(update.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_from_unfetched_state_has_no_price() {
        let update = PriceUpdate::from_state("CoinCap", CurrencyPair::btc_usd(), &PairState::default());
        assert_eq!(update.price, None);
        assert!(!update.success);
        assert_eq!(update.last_updated, DateTime::<Utc>::MIN_UTC);
    }

    #[tokio::test]
    async fn test_channel_sink_forwards_events() {
        let (sink, mut rx) = ChannelSink::new();
        sink.notify_updating("CoinCap", CurrencyPair::btc_usd());

        let state = PairState {
            price: 1.0,
            has_price: true,
            was_last_update_successful: true,
            ..PairState::default()
        };
        let update = PriceUpdate::from_state("CoinCap", CurrencyPair::btc_usd(), &state);
        sink.notify_price_set(&update);

        assert_eq!(
            rx.recv().await,
            Some(SinkEvent::Updating {
                provider: "CoinCap".to_string(),
                pair: CurrencyPair::btc_usd()
            })
        );
        assert_eq!(rx.recv().await, Some(SinkEvent::PriceSet(update)));
    }

    #[test]
    fn test_channel_sink_tolerates_closed_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.notify_updating("CoinCap", CurrencyPair::btc_usd());
    }
}
