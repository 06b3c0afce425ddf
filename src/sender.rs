// Sender agent: collect a sample, POST it, wait, repeat.
// Failures are logged and counted; the loop only stops on shutdown.

use crate::models::StatsPayload;
use crate::sysinfo_repo::SysinfoRepo;
use crate::version::{NAME, VERSION};
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::time::Duration;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("no response from {url} within {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },
    #[error("{url} responded {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Acknowledgement body returned by POST /stats.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IngestAck {
    pub message: String,
    #[serde(default)]
    pub stored: Option<usize>,
}

/// HTTP client bound to one ingest URL with a per-request timeout.
pub struct StatsClient {
    client: reqwest::Client,
    api_url: String,
    timeout: Duration,
}

impl StatsClient {
    pub fn new(api_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}-sender/{}", NAME, VERSION))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.to_string(),
            timeout,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub async fn send(&self, payload: &StatsPayload) -> Result<IngestAck, SendError> {
        let response = self
            .client
            .post(&self.api_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::Status {
                url: self.api_url.clone(),
                status: status.as_u16(),
                body,
            });
        }
        // A 2xx with an unexpected body still counts as delivered.
        Ok(response.json::<IngestAck>().await.unwrap_or(IngestAck {
            message: "Success".into(),
            stored: None,
        }))
    }

    fn classify(&self, e: reqwest::Error) -> SendError {
        let url = self.api_url.clone();
        if e.is_timeout() {
            SendError::Timeout {
                url,
                timeout_secs: self.timeout.as_secs(),
            }
        } else if e.is_connect() {
            SendError::Connect { url, source: e }
        } else {
            SendError::Request { url, source: e }
        }
    }
}

/// Delivery counters, shared with whoever spawned the sender.
#[derive(Debug, Clone, Default)]
pub struct SenderCounters {
    pub sent: Arc<AtomicU64>,
    pub failed: Arc<AtomicU64>,
}

impl SenderCounters {
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Repos, client, and shutdown for the sender loop.
pub struct SenderDeps {
    pub sysinfo_repo: Arc<SysinfoRepo>,
    pub client: StatsClient,
    pub counters: SenderCounters,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Sender timing.
pub struct SenderTiming {
    /// Delay after each cycle before the next sample starts.
    pub interval: Duration,
    /// Counter window for disk/network rates; part of every cycle.
    pub sample_window: Duration,
}

/// Collect one sample and deliver it.
pub async fn collect_and_send(
    sysinfo_repo: &SysinfoRepo,
    client: &StatsClient,
    sample_window: Duration,
) -> anyhow::Result<IngestAck> {
    let payload = sysinfo_repo.collect(sample_window).await?;
    tracing::debug!(payload = ?payload, "collected stats");
    Ok(client.send(&payload).await?)
}

pub fn spawn(deps: SenderDeps, timing: SenderTiming) -> tokio::task::JoinHandle<()> {
    let SenderDeps {
        sysinfo_repo,
        client,
        counters,
        mut shutdown_rx,
    } = deps;
    let SenderTiming {
        interval,
        sample_window,
    } = timing;

    tokio::spawn(async move {
        loop {
            tokio::select! {
                result = collect_and_send(&sysinfo_repo, &client, sample_window) => {
                    match result {
                        Ok(ack) => {
                            counters.sent.fetch_add(1, Ordering::Relaxed);
                            tracing::info!(
                                ack = %ack.message,
                                stored = ?ack.stored,
                                "stats delivered"
                            );
                        }
                        Err(e) => {
                            counters.failed.fetch_add(1, Ordering::Relaxed);
                            tracing::warn!(
                                error = %format!("{:#}", e),
                                api_url = client.api_url(),
                                "stats not delivered"
                            );
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Sender shutting down");
                    break;
                }
            }
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = &mut shutdown_rx => {
                    tracing::debug!("Sender shutting down");
                    break;
                }
            }
        }
    })
}
