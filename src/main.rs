use std::sync::Arc;
use anyhow::Context;
use candle_infra::config::AppConfig;
use candle_infra::controls::ShutdownSignal;
use candle_infra::fetch::{CandleClient, ReqwestTransport};
use candle_infra::observability::metrics::{gather_text, register_metrics};
use candle_infra::observability::tracing::init_tracing;
use candle_infra::registry::{CurrencyNames, ProfileRegistry};
use candle_infra::scheduler::{IngestionService, Poller};
use candle_infra::storage::JsonLinesSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("CANDLEINFRA_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;

    init_tracing(&config.logging).context("initializing logging")?;
    register_metrics().context("registering metrics")?;

    let registry = Arc::new(ProfileRegistry::load(&config.profiles_path).context("loading exchange profiles")?);
    let currencies = Arc::new(CurrencyNames::load(&config.currencies_path).context("loading currency names")?);
    let transport = Arc::new(ReqwestTransport::new(&config.http)?);
    let sink = Arc::new(JsonLinesSink::open(&config.storage.dir).await?);

    let poller = Poller::new(
        registry,
        currencies,
        CandleClient::new(transport),
        Arc::new(config.api_keys.clone()),
    );

    let shutdown = ShutdownSignal::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.trigger();
        }
    });

    let service = IngestionService::new(poller, sink, config.scheduler.clone(), shutdown);
    let report = service.run(config.scheduler.max_iterations).await?;

    tracing::info!(
        "Ingestion finished ({:?}): {} candles stored, {} streams caught up, {} abandoned, {} remaining",
        report.end,
        report.candles_stored,
        report.caught_up.len(),
        report.abandoned.len(),
        report.remaining.len()
    );
    for (task, reason) in &report.abandoned {
        tracing::error!("Abandoned {}: {}", task, reason);
    }
    tracing::debug!("Metrics:\n{}", gather_text()?);

    Ok(())
}
