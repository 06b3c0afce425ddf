// Sender agent: samples this host and POSTs to the stats API until interrupted.

use anyhow::Result;
use pistats::config::AppConfig;
use pistats::sender::{self, SenderCounters, SenderDeps, SenderTiming, StatsClient};
use pistats::sysinfo_repo::SysinfoRepo;
use pistats::{signal, telemetry};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let app_config = AppConfig::load()?;
    let cfg = &app_config.sender;
    let client = StatsClient::new(&cfg.api_url, Duration::from_secs(cfg.request_timeout_secs))?;
    tracing::info!(
        api_url = %cfg.api_url,
        interval_secs = cfg.interval_secs,
        "Starting stats sender"
    );

    let counters = SenderCounters::default();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = sender::spawn(
        SenderDeps {
            sysinfo_repo: Arc::new(SysinfoRepo::new()),
            client,
            counters: counters.clone(),
            shutdown_rx,
        },
        SenderTiming {
            interval: Duration::from_secs(cfg.interval_secs),
            sample_window: Duration::from_millis(cfg.sample_window_ms),
        },
    );

    signal::shutdown_signal().await;
    let _ = shutdown_tx.send(());
    handle.await?;
    tracing::info!(
        sent = counters.sent(),
        failed = counters.failed(),
        "Stats sender stopped"
    );
    Ok(())
}
