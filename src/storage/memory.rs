use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use async_trait::async_trait;
use crate::error::{Error, Result};
use crate::interfaces::CandleSink;
use crate::types::{Candle, FetchResult};

type StreamKey = (String, String);

/// Candles kept in memory, keyed by (exchange, pair) and upserted by timestamp.
#[derive(Debug, Default)]
pub struct InMemorySink {
    streams: Mutex<HashMap<StreamKey, BTreeMap<i64, Candle>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a stream, e.g. to resume from a known watermark.
    pub fn seed(&self, exchange_id: &str, trading_pair: &str, candles: impl IntoIterator<Item = Candle>) -> Result<()> {
        let mut streams = self.lock()?;
        let stream = streams.entry((exchange_id.to_string(), trading_pair.to_string())).or_default();
        for candle in candles {
            stream.insert(candle.timestamp, candle);
        }
        Ok(())
    }

    pub fn candles(&self, exchange_id: &str, trading_pair: &str) -> Result<Vec<Candle>> {
        let streams = self.lock()?;
        Ok(streams
            .get(&(exchange_id.to_string(), trading_pair.to_string()))
            .map(|stream| stream.values().copied().collect())
            .unwrap_or_default())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|s| s.values().map(BTreeMap::len).sum()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<StreamKey, BTreeMap<i64, Candle>>>> {
        self.streams.lock().map_err(|e| Error::Persistence(format!("sink lock poisoned: {}", e)))
    }
}

#[async_trait]
impl CandleSink for InMemorySink {
    async fn latest_timestamp(&self, exchange_id: &str, trading_pair: &str) -> Result<Option<i64>> {
        let streams = self.lock()?;
        Ok(streams
            .get(&(exchange_id.to_string(), trading_pair.to_string()))
            .and_then(|stream| stream.keys().next_back().copied()))
    }

    async fn store(&self, result: FetchResult) -> Result<()> {
        self.seed(&result.exchange, &result.trading_pair, result.candles)
    }
}
