// Host metrics via sysinfo, shaped into the sender's StatsPayload.

mod linux;

use crate::models::*;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use sysinfo::{Components, Disks, Networks, System};
use tracing::instrument;

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Cumulative byte counters summed over all disks and interfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoCounters {
    pub disk_read: u64,
    pub disk_written: u64,
    pub net_received: u64,
    pub net_sent: u64,
}

impl IoCounters {
    /// MB/s between two reads. Counters that went backwards (interface reset,
    /// disk removed) count as zero.
    pub fn rates_since(&self, before: &IoCounters, elapsed: Duration) -> (DiskIo, NetworkIo) {
        let secs = elapsed.as_secs_f64();
        let rate = |after: u64, before: u64| {
            if secs > 0.0 {
                after.saturating_sub(before) as f64 / secs / BYTES_PER_MB
            } else {
                0.0
            }
        };
        (
            DiskIo {
                read: rate(self.disk_read, before.disk_read),
                write: rate(self.disk_written, before.disk_written),
            },
            NetworkIo {
                received: rate(self.net_received, before.net_received),
                sent: rate(self.net_sent, before.net_sent),
            },
        )
    }
}

/// Sensor labels that report CPU die or package temperature.
pub fn is_cpu_sensor(label: &str) -> bool {
    let label = label.to_ascii_lowercase();
    ["cpu", "core", "package", "tctl", "tdie", "soc"]
        .iter()
        .any(|k| label.contains(k))
}

pub struct SysinfoRepo {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
    networks: Arc<Mutex<Networks>>,
    components: Arc<Mutex<Components>>,
}

impl Default for SysinfoRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoRepo {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        sys.refresh_memory();
        Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(Disks::new_with_refreshed_list())),
            networks: Arc::new(Mutex::new(Networks::new_with_refreshed_list())),
            components: Arc::new(Mutex::new(Components::new_with_refreshed_list())),
        }
    }

    /// One full sample. Blocks for `window` between the two counter reads
    /// used for disk/network rates; CPU usage is measured over the same window.
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "collect"))]
    pub async fn collect(&self, window: Duration) -> anyhow::Result<StatsPayload> {
        self.refresh_cpu().await?;
        let before = self.read_io_counters().await?;
        let started = Instant::now();
        tokio::time::sleep(window).await;
        let after = self.read_io_counters().await?;
        let (disk_io, network_io) = after.rates_since(&before, started.elapsed());

        let usage = self.refresh_cpu().await?;
        let temperature = self.get_cpu_temperature().await?;
        let memory = self.get_memory().await?;

        Ok(StatsPayload {
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            cpu: CpuReading { usage, temperature },
            gpu: GpuReading {
                usage: None,
                temperature: None,
            },
            memory,
            disk: DiskReading { io: disk_io },
            network: NetworkReading { io: network_io },
        })
    }

    /// Refreshes CPU state and returns global usage since the previous refresh.
    async fn refresh_cpu(&self) -> anyhow::Result<f64> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_cpu_all();
            Ok((sys.global_cpu_usage() as f64).clamp(0.0, 100.0))
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_memory"))]
    pub async fn get_memory(&self) -> anyhow::Result<MemoryReading> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_memory();
            Ok(MemoryReading {
                total: sys.total_memory() as f64 / BYTES_PER_MB,
                used: sys.used_memory() as f64 / BYTES_PER_MB,
                free: sys.free_memory() as f64 / BYTES_PER_MB,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    /// Hottest CPU sensor in Celsius; falls back to the first thermal zone on Linux.
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_cpu_temperature"))]
    pub async fn get_cpu_temperature(&self) -> anyhow::Result<Option<f64>> {
        let components = self.components.clone();
        tokio::task::spawn_blocking(move || {
            let mut components = components
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo components lock poisoned: {}", e))?;
            components.refresh(false);
            let hottest = components
                .list()
                .iter()
                .filter(|c| is_cpu_sensor(c.label()))
                .filter_map(|c| c.temperature())
                .map(f64::from)
                .filter(|t| t.is_finite())
                .max_by(f64::total_cmp);
            Ok(hottest.or_else(linux::read_thermal_zone_celsius))
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_io_counters"))]
    pub async fn read_io_counters(&self) -> anyhow::Result<IoCounters> {
        let disks = self.disks.clone();
        let networks = self.networks.clone();
        tokio::task::spawn_blocking(move || {
            let mut counters = IoCounters::default();
            {
                let mut disks = disks
                    .lock()
                    .map_err(|e| anyhow::anyhow!("sysinfo disks lock poisoned: {}", e))?;
                disks.refresh(true);
                for d in disks.list() {
                    let usage = d.usage();
                    counters.disk_read = counters.disk_read.saturating_add(usage.total_read_bytes);
                    counters.disk_written =
                        counters.disk_written.saturating_add(usage.total_written_bytes);
                }
            }
            let mut networks = networks
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo networks lock poisoned: {}", e))?;
            networks.refresh(true);
            for data in networks.list().values() {
                counters.net_received = counters.net_received.saturating_add(data.total_received());
                counters.net_sent = counters.net_sent.saturating_add(data.total_transmitted());
            }
            Ok(counters)
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }
}

/// IPv4 addresses configured on every interface, loopback included, ordered by interface name.
#[instrument(fields(repo = "sysinfo", operation = "local_ipv4_addresses"))]
pub async fn local_ipv4_addresses() -> anyhow::Result<Vec<String>> {
    tokio::task::spawn_blocking(|| {
        let networks = Networks::new_with_refreshed_list();
        let mut interfaces: Vec<_> = networks.list().iter().collect();
        interfaces.sort_by(|a, b| a.0.cmp(b.0));
        Ok(interfaces
            .into_iter()
            .flat_map(|(_, data)| data.ip_networks().iter())
            .filter(|n| n.addr.is_ipv4())
            .map(|n| n.addr.to_string())
            .collect())
    })
    .await
    .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_divide_by_elapsed_and_megabytes() {
        let before = IoCounters::default();
        let after = IoCounters {
            disk_read: 2 * 1_048_576,
            disk_written: 1_048_576,
            net_received: 4 * 1_048_576,
            net_sent: 0,
        };
        let (disk, net) = after.rates_since(&before, Duration::from_secs(2));
        assert_eq!(disk.read, 1.0);
        assert_eq!(disk.write, 0.5);
        assert_eq!(net.received, 2.0);
        assert_eq!(net.sent, 0.0);
    }

    #[test]
    fn rates_saturate_on_counter_reset() {
        let before = IoCounters {
            net_received: 10_000,
            ..Default::default()
        };
        let (_, net) = IoCounters::default().rates_since(&before, Duration::from_secs(1));
        assert_eq!(net.received, 0.0);
    }

    #[test]
    fn zero_elapsed_yields_zero_rates() {
        let after = IoCounters {
            disk_read: 1_048_576,
            ..Default::default()
        };
        let (disk, _) = after.rates_since(&IoCounters::default(), Duration::ZERO);
        assert_eq!(disk.read, 0.0);
    }

    #[test]
    fn cpu_sensor_labels() {
        assert!(is_cpu_sensor("cpu_thermal temp1"));
        assert!(is_cpu_sensor("coretemp Package id 0"));
        assert!(is_cpu_sensor("k10temp Tctl"));
        assert!(!is_cpu_sensor("nvme Composite"));
        assert!(!is_cpu_sensor("acpitz temp1"));
    }
}
