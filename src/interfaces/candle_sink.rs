use crate::error::Result;
use crate::types::FetchResult;
use async_trait::async_trait;

/// Durable home of normalized candles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandleSink: Send + Sync {
    /// Watermark of a stream: the newest stored candle timestamp, if any.
    async fn latest_timestamp(&self, exchange_id: &str, trading_pair: &str) -> Result<Option<i64>>;
    async fn store(&self, result: FetchResult) -> Result<()>;
}
