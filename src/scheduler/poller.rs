use std::sync::Arc;
use crate::adapter::{build_url, normalize, resolve, to_interval_token, RequestParams};
use crate::config::ApiKeys;
use crate::error::{Error, Result};
use crate::fetch::{extract_candles, CandleClient};
use crate::registry::{CurrencyNames, ProfileRegistry};
use crate::types::{FetchResult, StreamTask};

/// Fetches and normalizes one batch of candles for one stream.
#[derive(Clone)]
pub struct Poller {
    registry: Arc<ProfileRegistry>,
    currencies: Arc<CurrencyNames>,
    client: CandleClient,
    api_keys: Arc<ApiKeys>,
}

impl Poller {
    pub fn new(
        registry: Arc<ProfileRegistry>,
        currencies: Arc<CurrencyNames>,
        client: CandleClient,
        api_keys: Arc<ApiKeys>,
    ) -> Self {
        Poller { registry, currencies, client, api_keys }
    }

    pub fn registry(&self) -> &Arc<ProfileRegistry> {
        &self.registry
    }

    /// Request up to `limit` candles of `period` seconds starting at `start`.
    pub async fn poll(&self, task: &StreamTask, start: i64, limit: u32, period: i64) -> Result<FetchResult> {
        let profile = self.registry.lookup(&task.api)?;

        let apikey = self.api_keys.get(&task.api).cloned();
        if profile.requires_api_key && apikey.is_none() {
            return Err(Error::MissingParameter {
                api: task.api.clone(),
                name: "apikey".to_string(),
            });
        }

        let pair = resolve(profile, &self.currencies, &task.trading_pair)?;
        let end = start + period * i64::from(limit);
        if end <= start {
            return Err(Error::ConfigError(format!(
                "empty request window for {}: period={} limit={}",
                task, period, limit
            )));
        }

        let interval = match profile.time_interval {
            Some(_) => Some(to_interval_token(profile, period)?),
            None => None,
        };

        let params = RequestParams {
            exchange: task.exchange_id.clone(),
            trading_pair: pair.trading_pair,
            base_id: pair.base_id,
            quote_id: pair.quote_id,
            apikey,
            period,
            start,
            end,
            limit,
            interval,
        };
        let url = build_url(profile, &params)?;

        let envelope = self.client.fetch(&url).await?;
        let raw_candles = extract_candles(profile, envelope, period)?;
        if raw_candles.is_empty() {
            return Err(Error::EmptyResponse {
                api: task.api.clone(),
                exchange: task.exchange_id.clone(),
                trading_pair: task.trading_pair.clone(),
            });
        }

        let mut candles = raw_candles
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let replacement = profile.candle_timestamp_replace.then(|| start + period * i as i64);
                normalize(profile, raw, replacement)
            })
            .collect::<Result<Vec<_>>>()?;
        candles.sort_by_key(|c| c.timestamp);

        let last_timestamp = candles.last().map(|c| c.timestamp).unwrap_or(start);
        tracing::debug!(
            "Fetched {} candles for {} up to {}",
            candles.len(),
            task,
            last_timestamp
        );

        Ok(FetchResult {
            api: task.api.clone(),
            exchange: task.exchange_id.clone(),
            trading_pair: task.trading_pair.clone(),
            period,
            candles,
            last_timestamp,
        })
    }
}
