//! Per-provider price memory, one entry per supported currency pair

use chrono::{DateTime, Utc};
use coin_ticker_common::{CurrencyPair, Result, TickerError};
use std::collections::HashMap;

use crate::provider::CurrencyMatrix;

/// Cached price and freshness for one provider and one pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairState {
    pub price: f64,
    pub has_price: bool,
    pub is_updating: bool,
    pub last_successful_update: DateTime<Utc>,
    pub was_last_update_successful: bool,
}

impl Default for PairState {
    fn default() -> Self {
        Self {
            price: 0.0,
            has_price: false,
            is_updating: false,
            last_successful_update: DateTime::<Utc>::MIN_UTC,
            was_last_update_successful: false,
        }
    }
}

impl PairState {
    /// Price to display, `None` until a fetch has succeeded
    pub fn display_price(&self) -> Option<f64> {
        self.has_price.then_some(self.price)
    }
}

/// Pair states for one provider.
///
/// Every accepted pair gets an entry up front, so a missing key always means
/// the pair is unsupported and never "not fetched yet".
#[derive(Debug, Clone)]
pub struct PairStateStore {
    matrix: CurrencyMatrix,
    states: HashMap<CurrencyPair, PairState>,
}

impl PairStateStore {
    pub fn new(matrix: CurrencyMatrix) -> Self {
        let states = matrix
            .pairs()
            .map(|pair| (pair, PairState::default()))
            .collect();
        Self { matrix, states }
    }

    fn entry(&self, pair: CurrencyPair) -> Result<&PairState> {
        self.matrix.check(pair)?;
        self.states
            .get(&pair)
            .ok_or(TickerError::CurrencyNotSupported(pair.crypto.into()))
    }

    fn entry_mut(&mut self, pair: CurrencyPair) -> Result<&mut PairState> {
        self.matrix.check(pair)?;
        self.states
            .get_mut(&pair)
            .ok_or(TickerError::CurrencyNotSupported(pair.crypto.into()))
    }

    pub fn snapshot(&self, pair: CurrencyPair) -> Result<PairState> {
        self.entry(pair).copied()
    }

    pub fn pairs(&self) -> impl Iterator<Item = CurrencyPair> + '_ {
        self.matrix.pairs()
    }

    pub fn price(&self, pair: CurrencyPair) -> Result<f64> {
        Ok(self.entry(pair)?.price)
    }

    pub fn set_price(&mut self, pair: CurrencyPair, price: f64) -> Result<()> {
        let state = self.entry_mut(pair)?;
        state.price = price;
        state.has_price = true;
        Ok(())
    }

    pub fn has_price(&self, pair: CurrencyPair) -> Result<bool> {
        Ok(self.entry(pair)?.has_price)
    }

    pub fn is_updating(&self, pair: CurrencyPair) -> Result<bool> {
        Ok(self.entry(pair)?.is_updating)
    }

    pub fn set_updating(&mut self, pair: CurrencyPair, updating: bool) -> Result<()> {
        self.entry_mut(pair)?.is_updating = updating;
        Ok(())
    }

    pub fn last_successful_update(&self, pair: CurrencyPair) -> Result<DateTime<Utc>> {
        Ok(self.entry(pair)?.last_successful_update)
    }

    pub fn set_last_successful_update(
        &mut self,
        pair: CurrencyPair,
        at: DateTime<Utc>,
    ) -> Result<()> {
        self.entry_mut(pair)?.last_successful_update = at;
        Ok(())
    }

    pub fn was_last_update_successful(&self, pair: CurrencyPair) -> Result<bool> {
        Ok(self.entry(pair)?.was_last_update_successful)
    }

    pub fn set_was_last_update_successful(
        &mut self,
        pair: CurrencyPair,
        successful: bool,
    ) -> Result<()> {
        self.entry_mut(pair)?.was_last_update_successful = successful;
        Ok(())
    }

    /// Claim the pair for a refresh. Returns false if one is already running.
    pub fn try_begin_update(&mut self, pair: CurrencyPair) -> Result<bool> {
        let state = self.entry_mut(pair)?;
        if state.is_updating {
            return Ok(false);
        }
        state.is_updating = true;
        Ok(true)
    }

    pub fn record_success(
        &mut self,
        pair: CurrencyPair,
        price: f64,
        at: DateTime<Utc>,
    ) -> Result<PairState> {
        let state = self.entry_mut(pair)?;
        state.price = price;
        state.has_price = true;
        state.last_successful_update = at;
        state.was_last_update_successful = true;
        state.is_updating = false;
        Ok(*state)
    }

    /// Marks the attempt failed. Price and last success time are kept.
    pub fn record_failure(&mut self, pair: CurrencyPair) -> Result<PairState> {
        let state = self.entry_mut(pair)?;
        state.was_last_update_successful = false;
        state.is_updating = false;
        Ok(*state)
    }
}
