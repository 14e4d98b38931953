//! Common types and utilities shared across Coin Ticker components

pub mod config;
pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
