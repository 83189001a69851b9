use tracing::Span;
use tracing_subscriber::EnvFilter;
use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use crate::types::StreamTask;

/// Install the global subscriber. `RUST_LOG` wins over the configured filter.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| Error::ConfigError(format!("log filter: {}", e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| Error::ConfigError(format!("tracing subscriber: {}", e)))
}

pub fn trace_stream_poll(task: &StreamTask, start: i64) -> Span {
    tracing::info_span!(
        "stream_poll",
        api = %task.api,
        exchange = %task.exchange_id,
        trading_pair = %task.trading_pair,
        start,
    )
}

pub fn trace_api_worker(api: &str) -> Span {
    tracing::info_span!("api_worker", api = %api)
}
