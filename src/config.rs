use serde::Deserialize;

use crate::history_repo::HistoryOrder;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub history: HistoryConfig,
    pub sender: SenderConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Serve GET /ips (IPv4 addresses of the host's interfaces).
    pub expose_ips: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 1337,
            expose_ips: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Max number of samples kept in memory; oldest are evicted first.
    pub capacity: usize,
    pub order: HistoryOrder,
    /// Reject samples without a non-empty string `timestamp`.
    pub require_timestamp: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 60,
            order: HistoryOrder::default(),
            require_timestamp: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    pub api_url: String,
    pub interval_secs: u64,
    pub request_timeout_secs: u64,
    /// Window between the two counter reads used for disk and network rates.
    pub sample_window_ms: u64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:1337/stats".into(),
            interval_secs: 5,
            request_timeout_secs: 5,
            sample_window_ms: 1000,
        }
    }
}

impl AppConfig {
    /// Load from `CONFIG_FILE` (default `config.toml`), then apply env overrides.
    /// Without `CONFIG_FILE` and without a `config.toml`, built-in defaults are used.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match std::env::var("CONFIG_FILE") {
            Ok(path) => {
                let s = std::fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("reading {}: {}", path, e))?;
                toml::from_str(&s)?
            }
            Err(_) => match std::fs::read_to_string("config.toml") {
                Ok(s) => toml::from_str(&s)?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
                Err(e) => return Err(anyhow::anyhow!("reading config.toml: {}", e)),
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PORT`, `HOST`, `HISTORY_CAPACITY` and `API_URL` from `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PORT") {
            self.server.port = v
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT must be a port number, got {:?}: {}", v, e))?;
        }
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("HISTORY_CAPACITY") {
            self.history.capacity = v.trim().parse().map_err(|e| {
                anyhow::anyhow!("HISTORY_CAPACITY must be an integer, got {:?}: {}", v, e)
            })?;
        }
        if let Some(v) = lookup("API_URL") {
            self.sender.api_url = v;
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            self.history.capacity > 0,
            "history.capacity must be > 0, got {}",
            self.history.capacity
        );
        anyhow::ensure!(
            self.sender.api_url.starts_with("http://") || self.sender.api_url.starts_with("https://"),
            "sender.api_url must be an http(s) URL, got {:?}",
            self.sender.api_url
        );
        anyhow::ensure!(
            self.sender.interval_secs > 0,
            "sender.interval_secs must be > 0, got {}",
            self.sender.interval_secs
        );
        anyhow::ensure!(
            self.sender.request_timeout_secs > 0,
            "sender.request_timeout_secs must be > 0, got {}",
            self.sender.request_timeout_secs
        );
        anyhow::ensure!(
            self.sender.sample_window_ms > 0,
            "sender.sample_window_ms must be > 0, got {}",
            self.sender.sample_window_ms
        );
        anyhow::ensure!(
            self.sender.sample_window_ms < self.sender.interval_secs.saturating_mul(1000),
            "sender.sample_window_ms must be shorter than sender.interval_secs, got {} ms vs {} s",
            self.sender.sample_window_ms,
            self.sender.interval_secs
        );
        Ok(())
    }
}
