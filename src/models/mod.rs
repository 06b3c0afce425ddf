// Domain models

mod payload;
mod sample;

pub use payload::{
    CpuReading, DiskIo, DiskReading, GpuReading, MemoryReading, NetworkIo, NetworkReading,
    StatsPayload,
};
pub use sample::{Sample, SampleError};
