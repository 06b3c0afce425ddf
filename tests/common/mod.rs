// Shared test helpers

#![allow(dead_code)]

use pistats::config::AppConfig;
use pistats::history_repo::{HistoryOrder, HistoryRepo};
use pistats::models::Sample;
use pistats::routes;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

/// A sample tagged with `seq` so order and identity can be checked.
pub fn seq_sample(seq: u64) -> Sample {
    Sample::try_from(json!({
        "timestamp": format!("2024-01-01T00:{:02}:{:02}Z", (seq / 60) % 60, seq % 60),
        "seq": seq,
        "cpu": { "usage": seq as f64 / 10.0, "temperature": null },
    }))
    .unwrap()
}

pub fn seq_of(sample: &serde_json::Value) -> u64 {
    sample.get("seq").and_then(|v| v.as_u64()).unwrap()
}

pub fn seqs(samples: &[Sample]) -> Vec<u64> {
    samples
        .iter()
        .map(|s| s.get("seq").and_then(|v| v.as_u64()).unwrap())
        .collect()
}

pub fn repo(capacity: usize, order: HistoryOrder) -> Arc<HistoryRepo> {
    Arc::new(HistoryRepo::new(capacity, order).unwrap())
}

pub fn config(order: HistoryOrder, require_timestamp: bool) -> AppConfig {
    let mut config = AppConfig::default();
    config.history.order = order;
    config.history.require_timestamp = require_timestamp;
    config
}

/// Serve the router on an ephemeral loopback port.
pub async fn serve(repo: Arc<HistoryRepo>, config: AppConfig) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = routes::app(repo, config);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A loopback address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
