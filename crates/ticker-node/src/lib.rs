pub mod controller;
pub mod fetcher;
pub mod memory;
pub mod provider;
pub mod registry;
pub mod sink;

pub use coin_ticker_common as common;

pub use controller::{ControllerSettings, ProviderRefresh, RefreshController, RefreshCycle, RefreshOutcome};
pub use fetcher::{HttpFetcher, PayloadFetcher};
pub use memory::{PairState, PairStateStore};
pub use provider::{CurrencyMatrix, PriceProvider};
pub use sink::{ChannelSink, LoggingSink, PresentationSink, PriceUpdate, SinkEvent};
