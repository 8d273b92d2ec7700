use serde::{Deserialize, Serialize};

/// Operating system identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsIdentity {
    pub os: Option<String>,
    pub release: Option<String>,
    pub version: Option<String>,
    pub architecture: Option<String>,
}

/// Load averages over 1, 5 and 15 minutes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

/// Physical memory in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub free: u64,
}

/// Swap space in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapInfo {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

/// A mounted filesystem as listed by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountPoint {
    pub device: String,
    pub mount_point: String,
    pub file_system: String,
    /// Capacity reported at listing time, used where no per-mount query exists
    pub total: u64,
    pub available: u64,
}

/// Filesystem capacity and usage in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesystemUsage {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

/// Cumulative per-interface traffic counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkCounters {
    pub interface: String,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// One hardware sensor reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Sensor chip, e.g. `coretemp`
    pub chip: String,
    /// Label within the chip, e.g. `Package id 0`
    pub label: Option<String>,
    /// Current temperature in Celsius, if the sensor reported one
    pub current: Option<f64>,
}

/// GPU framebuffer memory in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GpuMemory {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

/// GPU utilization percentages over the driver's last sample period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GpuUtilization {
    pub core: u32,
    pub memory: u32,
}

/// Startup availability of a probe's data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeStatus {
    /// Source missing on this host; the probe always reports nothing
    Unavailable,
    /// Source present; individual collections may still come back empty
    Available,
    /// Turned off by configuration
    Disabled,
}

impl ProbeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::Available => "available",
            Self::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
