// Typed stats payload produced by the sender agent.
// The service never deserializes into these; it stores samples opaquely.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuReading {
    /// Global usage, percent.
    pub usage: f64,
    /// Degrees Celsius, `None` when no sensor is readable.
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuReading {
    pub usage: Option<f64>,
    pub temperature: Option<f64>,
}

/// Memory in megabytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryReading {
    pub total: f64,
    pub used: f64,
    pub free: f64,
}

/// Disk throughput in MB/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskIo {
    pub read: f64,
    pub write: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskReading {
    pub io: DiskIo,
}

/// Network throughput in MB/s, summed over all interfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkIo {
    pub received: f64,
    pub sent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkReading {
    pub io: NetworkIo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsPayload {
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub cpu: CpuReading,
    pub gpu: GpuReading,
    pub memory: MemoryReading,
    pub disk: DiskReading,
    pub network: NetworkReading,
}
