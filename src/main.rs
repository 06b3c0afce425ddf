use anyhow::Result;
use pistats::*;
use std::sync::Arc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let app_config = config::AppConfig::load()?;
    let history_repo = Arc::new(history_repo::HistoryRepo::new(
        app_config.history.capacity,
        app_config.history.order,
    )?);

    let app = routes::app(history_repo, app_config.clone());
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        capacity = app_config.history.capacity,
        order = ?app_config.history.order,
        require_timestamp = app_config.history.require_timestamp,
        "Listening on http://{}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(signal::shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}
