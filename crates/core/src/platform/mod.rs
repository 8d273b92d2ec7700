pub mod host;
pub mod nvml;
pub mod tools;

#[cfg(test)]
pub mod fake;

use crate::{
    error::Result,
    model::{
        FilesystemUsage, GpuMemory, GpuUtilization, LoadAverage, MemoryInfo, MountPoint,
        NetworkCounters, OsIdentity, SensorReading, SwapInfo,
    },
};
use serde_json::Value;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

pub use host::SysinfoHost;
pub use tools::SystemTools;

/// Host-level statistics provider
pub trait HostStats: Send + Sync {
    /// OS name, release, version and architecture; unknown fields are `None`
    fn os_identity(&self) -> OsIdentity;

    /// Global CPU utilization, sampled over `interval` (blocking)
    fn cpu_percent(&self, interval: Duration) -> Result<f64>;

    fn load_average(&self) -> Result<LoadAverage>;

    fn memory(&self) -> Result<MemoryInfo>;

    fn swap(&self) -> Result<SwapInfo>;

    /// Real (non-virtual) mounted filesystems, in the order the host reports them
    fn mounts(&self) -> Result<Vec<MountPoint>>;

    fn filesystem_usage(&self, mount: &MountPoint) -> Result<FilesystemUsage>;

    fn network_counters(&self) -> Result<Vec<NetworkCounters>>;

    fn temperatures(&self) -> Result<Vec<SensorReading>>;
}

/// An initialized GPU driver session. Dropping it shuts the driver down.
pub trait GpuSession: Send + Sync {
    fn device_count(&self) -> Result<u32>;

    fn device(&self, index: u32) -> Result<Box<dyn GpuDevice + '_>>;
}

/// Per-device GPU queries; each one may fail independently
pub trait GpuDevice {
    fn name(&self) -> Result<String>;
    fn uuid(&self) -> Result<String>;
    fn memory(&self) -> Result<GpuMemory>;
    fn utilization(&self) -> Result<GpuUtilization>;
    /// Core temperature in Celsius
    fn temperature(&self) -> Result<u32>;
    /// Fan speed as a percentage of maximum
    fn fan_speed(&self) -> Result<u32>;
}

/// Runs external diagnostic binaries that print JSON
pub trait DiagnosticTools: Send + Sync {
    /// Resolve `program` to an executable path, or `None` if it is not installed
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Run `program` with `args` and parse its standard output as JSON.
    /// A non-zero exit status is an error.
    fn run_json(&self, program: &Path, args: &[&str]) -> Result<Value>;
}

/// Open the platform GPU driver session
pub fn gpu_session() -> Result<Box<dyn GpuSession>> {
    nvml::NvmlSession::init().map(|session| Box::new(session) as Box<dyn GpuSession>)
}
