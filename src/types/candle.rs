use serde::{Deserialize, Serialize};

/// Canonical OHLCV candle. Serializes with exactly these six keys.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,  // Unix seconds, bucket open
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// One poll's worth of normalized candles for a single stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    pub api: String,
    pub exchange: String,
    pub trading_pair: String,
    pub period: i64,
    pub candles: Vec<Candle>,  // Ascending by timestamp
    pub last_timestamp: i64,
}

impl FetchResult {
    pub fn candles_collected(&self) -> usize {
        self.candles.len()
    }
}
