use lazy_static::lazy_static;
use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
};
use crate::error::{Error, Result};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Poll metrics
    pub static ref POLLS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("candle_polls_total", "Total number of stream polls issued"),
        &["api"]
    ).expect("valid metric definition");

    pub static ref POLL_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("candle_poll_failures_total", "Stream polls that failed, by error kind"),
        &["api", "kind"]
    ).expect("valid metric definition");

    // Ingestion metrics
    pub static ref CANDLES_INGESTED: IntCounterVec = IntCounterVec::new(
        Opts::new("candles_ingested_total", "Normalized candles handed to the sink"),
        &["api"]
    ).expect("valid metric definition");

    pub static ref STREAMS_CAUGHT_UP: IntCounter = IntCounter::new(
        "candle_streams_caught_up_total",
        "Streams whose watermark reached the present"
    ).expect("valid metric definition");

    pub static ref PERSISTENCE_FAILURES: IntCounter = IntCounter::new(
        "candle_persistence_failures_total",
        "Batches the sink failed to store"
    ).expect("valid metric definition");

    // Latency metrics
    pub static ref FETCH_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "candle_fetch_latency_seconds",
            "Upstream candle request latency"
        ).buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0])
    ).expect("valid metric definition");
}

pub fn register_metrics() -> Result<()> {
    let register = |collector: Box<dyn prometheus::core::Collector>| {
        REGISTRY.register(collector)
            .map_err(|e| Error::ConfigError(format!("metrics registration: {}", e)))
    };

    register(Box::new(POLLS_TOTAL.clone()))?;
    register(Box::new(POLL_FAILURES.clone()))?;
    register(Box::new(CANDLES_INGESTED.clone()))?;
    register(Box::new(STREAMS_CAUGHT_UP.clone()))?;
    register(Box::new(PERSISTENCE_FAILURES.clone()))?;
    register(Box::new(FETCH_LATENCY.clone()))?;
    Ok(())
}

/// Render the registry in the Prometheus text format.
pub fn gather_text() -> Result<String> {
    use prometheus::Encoder;

    let mut buffer = Vec::new();
    prometheus::TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| Error::ConfigError(format!("metrics encoding: {}", e)))?;
    String::from_utf8(buffer).map_err(|e| Error::ConfigError(e.to_string()))
}
