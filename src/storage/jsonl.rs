use std::collections::HashMap;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use crate::error::{Error, Result};
use crate::interfaces::CandleSink;
use crate::types::{Candle, FetchResult};

/// Append-only JSON-lines files, one per (exchange, pair) stream.
///
/// Each line is one canonical candle and timestamps strictly increase down
/// the file: a batch only appends candles newer than the stream watermark,
/// so the boundary candle an upstream repeats at the start of every window
/// is written once. Watermarks are scanned from disk on first use and then
/// kept in memory.
pub struct JsonLinesSink {
    dir: PathBuf,
    watermarks: Mutex<HashMap<PathBuf, Option<i64>>>,
}

impl JsonLinesSink {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        Ok(JsonLinesSink { dir, watermarks: Mutex::new(HashMap::new()) })
    }

    fn stream_path(&self, exchange_id: &str, trading_pair: &str) -> PathBuf {
        let sanitize = |s: &str| -> String {
            s.chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
                .collect()
        };
        self.dir.join(format!("{}__{}.jsonl", sanitize(exchange_id), sanitize(trading_pair)))
    }

    async fn watermark(cache: &mut HashMap<PathBuf, Option<i64>>, path: &Path) -> Result<Option<i64>> {
        if let Some(&known) = cache.get(path) {
            return Ok(known);
        }
        let scanned = scan_watermark(path).await?;
        cache.insert(path.to_path_buf(), scanned);
        Ok(scanned)
    }
}

async fn scan_watermark(path: &Path) -> Result<Option<i64>> {
    let text = match fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::Persistence(format!("{}: {}", path.display(), e))),
    };

    let mut latest = None;
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        // A torn last line from an interrupted write is skipped.
        match serde_json::from_str::<Candle>(line) {
            Ok(candle) => latest = latest.max(Some(candle.timestamp)),
            Err(e) => tracing::warn!("Skipping unreadable line in {}: {}", path.display(), e),
        }
    }
    Ok(latest)
}

#[async_trait]
impl CandleSink for JsonLinesSink {
    async fn latest_timestamp(&self, exchange_id: &str, trading_pair: &str) -> Result<Option<i64>> {
        let path = self.stream_path(exchange_id, trading_pair);
        let mut cache = self.watermarks.lock().await;
        Self::watermark(&mut cache, &path).await
    }

    async fn store(&self, result: FetchResult) -> Result<()> {
        let path = self.stream_path(&result.exchange, &result.trading_pair);
        let mut cache = self.watermarks.lock().await;
        let watermark = Self::watermark(&mut cache, &path).await?;

        let fresh: Vec<&Candle> = result.candles
            .iter()
            .filter(|c| watermark.is_none_or(|w| c.timestamp > w))
            .collect();
        if fresh.is_empty() {
            tracing::debug!("No candles newer than {:?} for {}", watermark, path.display());
            return Ok(());
        }

        let mut buffer = String::new();
        for candle in &fresh {
            let line = serde_json::to_string(candle)
                .map_err(|e| Error::Persistence(e.to_string()))?;
            buffer.push_str(&line);
            buffer.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| Error::Persistence(format!("{}: {}", path.display(), e)))?;
        file.write_all(buffer.as_bytes())
            .await
            .map_err(|e| Error::Persistence(format!("{}: {}", path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| Error::Persistence(format!("{}: {}", path.display(), e)))?;

        let newest = fresh.iter().map(|c| c.timestamp).max();
        cache.insert(path.clone(), watermark.max(newest));
        tracing::debug!("Appended {} of {} candles to {}", fresh.len(), result.candles.len(), path.display());
        Ok(())
    }
}
