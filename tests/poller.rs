mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use candle_infra::error::{Error, Result};
use candle_infra::fetch::CandleClient;
use candle_infra::interfaces::{HttpResponse, HttpTransport};
use candle_infra::registry::{CurrencyNames, ProfileRegistry};
use candle_infra::scheduler::Poller;
use candle_infra::types::StreamTask;
use serde_json::json;

const START: i64 = 1_577_836_800;

/// Answers every request with the same canned response.
struct CannedTransport {
    status: u16,
    body: String,
    urls: Mutex<Vec<String>>,
}

impl CannedTransport {
    fn new(status: u16, body: serde_json::Value) -> Arc<Self> {
        Arc::new(CannedTransport {
            status,
            body: body.to_string(),
            urls: Mutex::new(Vec::new()),
        })
    }

    fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for CannedTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(HttpResponse { status: self.status, body: self.body.clone() })
    }
}

fn shipped_poller(transport: Arc<CannedTransport>) -> Poller {
    let registry = ProfileRegistry::load("data/api_info.json").unwrap();
    let currencies = CurrencyNames::load("data/cryptocurrencies.json").unwrap();
    Poller::new(
        Arc::new(registry),
        Arc::new(currencies),
        CandleClient::new(transport),
        Arc::new(HashMap::new()),
    )
}

#[tokio::test]
async fn test_coincap_poll_resolves_names_and_sorts() {
    let transport = CannedTransport::new(200, json!({
        "data": [
            {"open": "0.0205", "high": "0.021", "low": "0.0201", "close": "0.0208", "volume": "40.5", "period": 1_577_837_100_000i64},
            {"open": "0.02", "high": "0.0206", "low": "0.0199", "close": "0.0205", "volume": "12.5", "period": 1_577_836_800_000i64}
        ],
        "timestamp": 1_577_900_000_000i64
    }));
    let poller = shipped_poller(transport.clone());

    let task = StreamTask::new("coincap", "binance", "eth_btc");
    let result = poller.poll(&task, START, 100, 300).await.unwrap();

    assert_eq!(
        transport.urls(),
        vec!["https://api.coincap.io/v2/candles?exchange=binance&interval=m5&baseId=ethereum&quoteId=bitcoin&start=1577836800000&end=1577866800000"]
    );
    assert_eq!(result.candles_collected(), 2);
    assert_eq!(result.candles[0].timestamp, START);
    assert_eq!(result.candles[1].timestamp, START + 300);
    assert_eq!(result.candles[0].volume, 12.5);
    assert_eq!(result.last_timestamp, START + 300);
    assert_eq!(result.trading_pair, "eth_btc");
}

#[tokio::test]
async fn test_hitbtc_poll_renames_and_parses_iso_times() {
    let transport = CannedTransport::new(200, json!([
        {"timestamp": "2020-01-01T00:00:00.000Z", "open": "0.0201", "close": "0.0203", "min": "0.02", "max": "0.0204", "volume": "3", "volumeQuote": "0.06"}
    ]));
    let poller = shipped_poller(transport.clone());

    let task = StreamTask::new("hitbtc", "hitbtc", "eth_btc");
    let result = poller.poll(&task, START, 1000, 300).await.unwrap();

    assert_eq!(
        transport.urls(),
        vec!["https://api.hitbtc.com/api/2/public/candles/ETHBTC?period=M5&from=2020-01-01T00:00:00Z&till=2020-01-04T11:20:00Z&limit=1000"]
    );
    let candle = result.candles[0];
    assert_eq!(candle.timestamp, START);
    assert_eq!(candle.high, 0.0204);
    assert_eq!(candle.low, 0.02);
}

#[tokio::test]
async fn test_upstream_error_is_retryable() {
    let transport = CannedTransport::new(502, json!({"error": "bad gateway"}));
    let poller = shipped_poller(transport);

    let task = StreamTask::new("poloniex", "poloniex", "btc_eth");
    let err = poller.poll(&task, START, 100, 300).await.unwrap_err();

    assert!(matches!(err, Error::UpstreamHttp { status: 502, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_empty_candle_list_is_reported() {
    let transport = CannedTransport::new(200, json!({"data": []}));
    let poller = shipped_poller(transport);

    let task = StreamTask::new("coincap", "poloniex", "ltc_btc");
    let err = poller.poll(&task, START, 100, 300).await.unwrap_err();

    assert!(matches!(err, Error::EmptyResponse { ref exchange, .. } if exchange == "poloniex"));
}

#[tokio::test]
async fn test_unknown_currency_fails_before_any_request() {
    let transport = CannedTransport::new(200, json!({"data": []}));
    let poller = shipped_poller(transport.clone());

    let task = StreamTask::new("coincap", "binance", "doge_btc");
    let err = poller.poll(&task, START, 100, 300).await.unwrap_err();

    assert!(matches!(err, Error::UnresolvedPair { ref pair, .. } if pair == "doge_btc"));
    assert!(!err.is_retryable());
    assert!(transport.urls().is_empty());
}

#[tokio::test]
async fn test_api_key_is_required_and_attached() {
    let transport = CannedTransport::new(200, json!([[0, 1.0, 2.0, 0.5, 1.5, 10.0]]));
    let registry = common::registry(json!({
        "keyed": {
            "api_call": "https://keyed.test/{trading_pair}?after={start}&apikey={apikey}",
            "pair_format": ["strip_underscore"],
            "candlestick_order": [1, 2, 4, 3, 5, 0],
            "candle_timestamp_replace": true,
            "requires_api_key": true,
            "response": {"type": "Array"},
            "exchanges": {"keyedex": {"trading_pairs": ["eth_btc"]}}
        }
    }));
    let task = StreamTask::new("keyed", "keyedex", "eth_btc");

    let without = Poller::new(
        registry.clone(),
        common::currencies(),
        CandleClient::new(transport.clone()),
        Arc::new(HashMap::new()),
    );
    let err = without.poll(&task, START, 10, 300).await.unwrap_err();
    assert!(matches!(err, Error::MissingParameter { ref name, .. } if name == "apikey"));
    assert!(transport.urls().is_empty());

    let keys = HashMap::from([("keyed".to_string(), "s3cret".to_string())]);
    let with = Poller::new(registry, common::currencies(), CandleClient::new(transport.clone()), Arc::new(keys));
    let result = with.poll(&task, START, 10, 300).await.unwrap();

    assert_eq!(transport.urls(), vec!["https://keyed.test/ethbtc?after=1577836800&apikey=s3cret"]);
    // The raw timestamp is zero; the request start is used instead.
    assert_eq!(result.candles[0].timestamp, START);
    assert_eq!(result.candles[0].open, 1.0);
    assert_eq!(result.candles[0].close, 1.5);
    assert_eq!(result.candles[0].low, 0.5);
}
