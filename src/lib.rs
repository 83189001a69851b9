//! Multi-exchange candle ingestion.
//!
//! Exchange profiles describe each API's conventions as data; the adapter
//! layer turns canonical requests into API dialect and API responses back
//! into canonical [`types::Candle`]s, and the scheduler keeps every configured
//! stream polling until it has caught up with the present.

pub mod adapter;
pub mod config;
pub mod controls;
pub mod error;
pub mod fetch;
pub mod interfaces;
pub mod observability;
pub mod registry;
pub mod scheduler;
pub mod storage;
pub mod types;
pub mod utils;

pub use error::{Error, Result};

// Candle period polled by default (5 minutes)
pub const DEFAULT_PERIOD_SECS: i64 = 300;

// Candles requested per poll when a profile sets no limit
pub const DEFAULT_LIMIT: u32 = 100;
