#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use candle_infra::config::profile::ProfileConfig;
use candle_infra::config::SchedulerConfig;
use candle_infra::error::{Error, Result};
use candle_infra::fetch::CandleClient;
use candle_infra::interfaces::{CandleSink, HttpResponse, HttpTransport};
use candle_infra::registry::{CurrencyNames, ProfileRegistry};
use candle_infra::scheduler::Poller;
use candle_infra::storage::InMemorySink;
use candle_infra::types::FetchResult;
use candle_infra::types::timestamp::DEFAULT_START_TIMESTAMP;

pub const PERIOD: i64 = 300;
pub const LIMIT: i64 = 10;
/// Two full polls from the default start reach the present.
pub const NOW: i64 = DEFAULT_START_TIMESTAMP + 2 * LIMIT * PERIOD;

pub const MOCK_TEMPLATE: &str = "mock://{exchange}/{trading_pair}?start={start}&end={end}&limit={limit}";

/// Serves positional candles `[open, high, close, low, volume, ts]` for the
/// buckets after `start`, never past `horizon`. Pairs listed in `failing` get
/// a 503, pairs in `empty` get `[]`.
pub struct ScriptedTransport {
    pub calls: Mutex<Vec<String>>,
    pub failing: HashSet<String>,
    pub empty: HashSet<String>,
    pub horizon: i64,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        ScriptedTransport {
            calls: Mutex::new(Vec::new()),
            failing: HashSet::new(),
            empty: HashSet::new(),
            horizon: NOW,
        }
    }

    pub fn failing(pairs: &[&str]) -> Self {
        ScriptedTransport {
            failing: pairs.iter().map(|p| p.to_string()).collect(),
            ..Self::new()
        }
    }

    pub fn empty(pairs: &[&str]) -> Self {
        ScriptedTransport {
            empty: pairs.iter().map(|p| p.to_string()).collect(),
            ..Self::new()
        }
    }

    /// Serve every requested bucket, however recent.
    pub fn unbounded() -> Self {
        ScriptedTransport { horizon: i64::MAX, ..Self::new() }
    }

    /// Trading pairs in the order they were requested.
    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let rest = url.strip_prefix("mock://").expect("mock url");
        let (path, query) = rest.split_once('?').expect("query string");
        let pair = path.split('/').nth(1).expect("pair segment").to_string();
        let params: HashMap<&str, i64> = query
            .split('&')
            .filter_map(|kv| kv.split_once('='))
            .map(|(k, v)| (k, v.parse().expect("numeric param")))
            .collect();

        self.calls.lock().unwrap().push(pair.clone());

        if self.failing.contains(&pair) {
            return Ok(HttpResponse { status: 503, body: "unavailable".to_string() });
        }
        if self.empty.contains(&pair) {
            return Ok(HttpResponse { status: 200, body: "[]".to_string() });
        }

        let (start, end) = (params["start"], params["end"]);
        let candles: Vec<serde_json::Value> = (1..=LIMIT)
            .map(|k| start + k * PERIOD)
            .filter(|&ts| ts <= end && ts <= self.horizon)
            .map(|ts| serde_json::json!([1.0, 2.0, 1.5, 0.5, 10.0, ts]))
            .collect();

        Ok(HttpResponse { status: 200, body: serde_json::Value::from(candles).to_string() })
    }
}

pub fn mock_profile(pairs: &[&str]) -> serde_json::Value {
    mock_profile_on("mockex", pairs)
}

pub fn mock_profile_on(exchange: &str, pairs: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "api_call": MOCK_TEMPLATE,
        "pair_format": ["strip_underscore"],
        "candlestick_order": [0, 1, 2, 3, 4, 5],
        "response": {"type": "Array"},
        "limit": LIMIT,
        "exchanges": {exchange: {"trading_pairs": pairs}}
    })
}

pub fn registry(profiles: serde_json::Value) -> Arc<ProfileRegistry> {
    let configs: BTreeMap<String, ProfileConfig> = serde_json::from_value(profiles).unwrap();
    Arc::new(ProfileRegistry::from_configs(configs))
}

pub fn currencies() -> Arc<CurrencyNames> {
    Arc::new(
        [("BTC", "Bitcoin"), ("ETH", "Ethereum"), ("LTC", "Litecoin")]
            .into_iter()
            .map(|(code, name)| (code.to_string(), name.to_string()))
            .collect(),
    )
}

pub fn poller(registry: Arc<ProfileRegistry>, transport: Arc<dyn HttpTransport>) -> Poller {
    Poller::new(registry, currencies(), CandleClient::new(transport), Arc::new(HashMap::new()))
}

pub fn scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        period_secs: PERIOD,
        ..SchedulerConfig::default()
    }
}

/// Sink that refuses the first `failures` batches, then behaves like memory.
pub struct FlakySink {
    pub inner: InMemorySink,
    pub failures: Mutex<usize>,
}

impl FlakySink {
    pub fn new(failures: usize) -> Self {
        FlakySink { inner: InMemorySink::new(), failures: Mutex::new(failures) }
    }
}

#[async_trait]
impl CandleSink for FlakySink {
    async fn latest_timestamp(&self, exchange_id: &str, trading_pair: &str) -> Result<Option<i64>> {
        self.inner.latest_timestamp(exchange_id, trading_pair).await
    }

    async fn store(&self, result: FetchResult) -> Result<()> {
        {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(Error::Persistence("database unavailable".to_string()));
            }
        }
        self.inner.store(result).await
    }
}
