//! Refresh controller: owns the providers and the selected pair, fans out
//! one refresh task per active provider and filters notifications down to
//! the current selection.

use chrono::{DateTime, Utc};
use coin_ticker_common::config::TickerConfig;
use coin_ticker_common::{CryptoCurrency, CurrencyPair, FiatCurrency, Result, TickerError};
use futures::future::join_all;
use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::fetcher::PayloadFetcher;
use crate::memory::{PairState, PairStateStore};
use crate::provider::PriceProvider;
use crate::sink::{PresentationSink, PriceUpdate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Upper bound on fetches in flight across all providers
    pub max_concurrent_fetches: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 16,
        }
    }
}

impl From<&TickerConfig> for ControllerSettings {
    fn from(config: &TickerConfig) -> Self {
        Self {
            max_concurrent_fetches: config.max_concurrent_fetches,
        }
    }
}

/// What happened to one provider during a refresh cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    Updated { price: f64 },
    /// Transport or payload failure; the cached price was kept
    Failed { reason: String },
    /// A refresh for this pair was already running
    InFlight,
    /// Provider does not quote the pair
    Excluded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderRefresh {
    pub provider: String,
    pub pair: CurrencyPair,
    pub outcome: RefreshOutcome,
}

/// Handles for the tasks started by one `refresh` call.
///
/// Dropping the cycle detaches the tasks; they still run to completion and
/// update the cache.
pub struct RefreshCycle {
    pair: CurrencyPair,
    finished: Vec<ProviderRefresh>,
    running: Vec<(String, JoinHandle<ProviderRefresh>)>,
}

impl RefreshCycle {
    fn new(pair: CurrencyPair) -> Self {
        Self {
            pair,
            finished: Vec::new(),
            running: Vec::new(),
        }
    }

    pub fn pair(&self) -> CurrencyPair {
        self.pair
    }

    /// Number of refresh tasks actually started
    pub fn spawned(&self) -> usize {
        self.running.len()
    }

    /// Wait for every task and collect the outcomes, skipped providers first
    pub async fn join(self) -> Vec<ProviderRefresh> {
        let pair = self.pair;
        let mut results = self.finished;
        let (names, handles): (Vec<String>, Vec<JoinHandle<ProviderRefresh>>) =
            self.running.into_iter().unzip();

        for (name, joined) in names.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(refresh) => results.push(refresh),
                Err(e) => {
                    error!("Refresh task for {} did not finish: {}", name, e);
                    results.push(ProviderRefresh {
                        provider: name,
                        pair,
                        outcome: RefreshOutcome::Failed {
                            reason: e.to_string(),
                        },
                    });
                }
            }
        }
        results
    }
}

struct ProviderSlot {
    provider: Box<dyn PriceProvider>,
    memory: RwLock<PairStateStore>,
}

pub struct RefreshController {
    slots: Vec<Arc<ProviderSlot>>,
    selection: RwLock<CurrencyPair>,
    sink: Arc<dyn PresentationSink>,
    fetcher: Arc<dyn PayloadFetcher>,
    permits: Semaphore,
}

impl RefreshController {
    pub fn new(
        providers: Vec<Box<dyn PriceProvider>>,
        selection: CurrencyPair,
        sink: Arc<dyn PresentationSink>,
        fetcher: Arc<dyn PayloadFetcher>,
        settings: ControllerSettings,
    ) -> Self {
        let slots = providers
            .into_iter()
            .map(|provider| {
                let memory = PairStateStore::new(provider.matrix().clone());
                Arc::new(ProviderSlot {
                    provider,
                    memory: RwLock::new(memory),
                })
            })
            .collect();

        Self {
            slots,
            selection: RwLock::new(selection),
            sink,
            fetcher,
            permits: Semaphore::new(settings.max_concurrent_fetches.max(1)),
        }
    }

    pub async fn selection(&self) -> CurrencyPair {
        *self.selection.read().await
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|slot| slot.provider.name().to_string())
            .collect()
    }

    /// Providers that quote the selected pair
    pub async fn active_providers(&self) -> Vec<String> {
        let pair = self.selection().await;
        self.slots
            .iter()
            .filter(|slot| slot.provider.supports(pair))
            .map(|slot| slot.provider.name().to_string())
            .collect()
    }

    pub async fn pair_state(&self, provider: &str, pair: CurrencyPair) -> Result<PairState> {
        let slot = self.slot(provider)?;
        let memory = slot.memory.read().await;
        memory.snapshot(pair)
    }

    fn slot(&self, name: &str) -> Result<&Arc<ProviderSlot>> {
        self.slots
            .iter()
            .find(|slot| slot.provider.name() == name)
            .ok_or_else(|| TickerError::UnknownProvider(name.to_string()))
    }

    pub async fn update_fiat_currency(&self, fiat: FiatCurrency) {
        self.change_selection(|pair| CurrencyPair::new(pair.crypto, fiat))
            .await;
    }

    pub async fn update_cryptocurrency(&self, crypto: CryptoCurrency) {
        self.change_selection(|pair| CurrencyPair::new(crypto, pair.fiat))
            .await;
    }

    pub async fn update_selection(&self, pair: CurrencyPair) {
        self.change_selection(|_| pair).await;
    }

    /// Switch the selection, then replay cached state for every provider that
    /// quotes the new pair. Nothing is fetched.
    async fn change_selection<F>(&self, change: F)
    where
        F: FnOnce(CurrencyPair) -> CurrencyPair,
    {
        let mut selection = self.selection.write().await;
        let previous = *selection;
        *selection = change(previous);
        let selection = selection.downgrade();
        let pair = *selection;
        info!("Selection changed from {} to {}", previous, pair);

        // the read guard is held until every replay is delivered, so a later
        // change cannot interleave with these notifications
        for slot in &self.slots {
            if !slot.provider.supports(pair) {
                continue;
            }
            let state = slot.memory.read().await.snapshot(pair);
            match state {
                Ok(state) => self.sink.notify_price_set(&PriceUpdate::from_state(
                    slot.provider.name(),
                    pair,
                    &state,
                )),
                Err(e) => debug!("{} skipped on selection change: {}", slot.provider.name(), e),
            }
        }
    }

    /// Start one refresh task per provider that quotes the selected pair.
    ///
    /// A provider whose refresh for this pair is still running is skipped.
    pub async fn refresh(self: &Arc<Self>) -> RefreshCycle {
        let pair = self.selection().await;
        let mut cycle = RefreshCycle::new(pair);

        for slot in &self.slots {
            let name = slot.provider.name().to_string();
            if !slot.provider.supports(pair) {
                cycle.finished.push(ProviderRefresh {
                    provider: name,
                    pair,
                    outcome: RefreshOutcome::Excluded,
                });
                continue;
            }

            let claimed = slot.memory.write().await.try_begin_update(pair);
            match claimed {
                Ok(true) => {}
                Ok(false) => {
                    debug!("{} is already refreshing {}, skipping", name, pair);
                    cycle.finished.push(ProviderRefresh {
                        provider: name,
                        pair,
                        outcome: RefreshOutcome::InFlight,
                    });
                    continue;
                }
                Err(e) => {
                    debug!("{} excluded from refresh: {}", name, e);
                    cycle.finished.push(ProviderRefresh {
                        provider: name,
                        pair,
                        outcome: RefreshOutcome::Excluded,
                    });
                    continue;
                }
            }

            let controller = Arc::clone(self);
            let slot = Arc::clone(slot);
            let handle = tokio::spawn(async move { controller.guarded_refresh(slot, pair).await });
            cycle.running.push((name, handle));
        }

        info!(
            "Refreshing {} from {} provider(s)",
            pair,
            cycle.running.len()
        );
        cycle
    }

    /// Runs `refresh_provider`, releasing the claim as a failed attempt if
    /// it panics.
    async fn guarded_refresh(&self, slot: Arc<ProviderSlot>, pair: CurrencyPair) -> ProviderRefresh {
        let attempt = AssertUnwindSafe(self.refresh_provider(Arc::clone(&slot), pair))
            .catch_unwind()
            .await;
        match attempt {
            Ok(refresh) => refresh,
            Err(panic) => {
                let name = slot.provider.name().to_string();
                let reason = format!("refresh panicked: {}", panic_message(panic.as_ref()));
                error!("❌ {} {}: {}", name, pair, reason);
                if let Err(e) = slot.memory.write().await.record_failure(pair) {
                    error!("{} could not release {}: {}", name, pair, e);
                }
                ProviderRefresh {
                    provider: name,
                    pair,
                    outcome: RefreshOutcome::Failed { reason },
                }
            }
        }
    }

    /// Body of one refresh task. The caller has already claimed the pair.
    async fn refresh_provider(&self, slot: Arc<ProviderSlot>, pair: CurrencyPair) -> ProviderRefresh {
        let name = slot.provider.name().to_string();
        self.notify_updating(&name, pair).await;

        let fetched = self.fetch_price(slot.provider.as_ref(), pair).await;

        let (recorded, outcome) = {
            let mut memory = slot.memory.write().await;
            match fetched {
                Ok((price, completed_at)) => {
                    info!("✅ {} {}: {:.2}", name, pair, price);
                    (
                        memory.record_success(pair, price, completed_at),
                        RefreshOutcome::Updated { price },
                    )
                }
                Err(e) if e.is_currency_not_supported() => {
                    debug!("{} excluded from {}: {}", name, pair, e);
                    if let Err(e) = memory.set_updating(pair, false) {
                        debug!("{} could not release {}: {}", name, pair, e);
                    }
                    return ProviderRefresh {
                        provider: name,
                        pair,
                        outcome: RefreshOutcome::Excluded,
                    };
                }
                Err(e) => {
                    warn!("❌ {} failed to refresh {}: {}", name, pair, e);
                    (
                        memory.record_failure(pair),
                        RefreshOutcome::Failed {
                            reason: e.to_string(),
                        },
                    )
                }
            }
        };

        match recorded {
            Ok(state) => self.notify_price_set(&name, pair, &state).await,
            Err(e) => error!("{} could not record {}: {}", name, pair, e),
        }

        ProviderRefresh {
            provider: name,
            pair,
            outcome,
        }
    }

    /// URL, fetch, extract. The timestamp is taken when the fetch completes.
    async fn fetch_price(
        &self,
        provider: &dyn PriceProvider,
        pair: CurrencyPair,
    ) -> Result<(f64, DateTime<Utc>)> {
        let url = provider.build_request_url(pair)?;

        let payload = {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|e| TickerError::Transport(e.to_string()))?;
            self.fetcher.fetch(&url).await?
        };
        let completed_at = Utc::now();

        let price = provider.extract_price(&payload, pair)?;
        Ok((price, completed_at))
    }

    async fn notify_updating(&self, provider: &str, pair: CurrencyPair) {
        let selection = self.selection.read().await;
        if *selection == pair {
            self.sink.notify_updating(provider, pair);
        }
    }

    async fn notify_price_set(&self, provider: &str, pair: CurrencyPair, state: &PairState) {
        let selection = self.selection.read().await;
        if *selection == pair {
            self.sink
                .notify_price_set(&PriceUpdate::from_state(provider, pair, state));
        } else {
            debug!(
                "{} result for {} cached but not shown, selection is {}",
                provider, pair, *selection
            );
        }
    }

    /// Refresh every `every` until `shutdown` resolves. Cycles are not
    /// awaited, so a slow provider never delays the next tick.
    pub async fn run<F>(self: Arc<Self>, every: Duration, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Refresh loop stopped");
                    return;
                }
                _ = ticker.tick() => {
                    let cycle = self.refresh().await;
                    debug!("Refresh cycle for {} started {} task(s)", cycle.pair(), cycle.spawned());
                }
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown cause"
    }
}
