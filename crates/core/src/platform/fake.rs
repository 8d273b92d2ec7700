//! In-memory data sources for probe tests.

use super::{DiagnosticTools, GpuDevice, GpuSession, HostStats};
use crate::{
    error::{CoreError, Result},
    model::{
        FilesystemUsage, GpuMemory, GpuUtilization, LoadAverage, MemoryInfo, MountPoint,
        NetworkCounters, OsIdentity, SensorReading, SwapInfo,
    },
};
use serde_json::Value;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

/// Canned host statistics. `None` fields make the matching query fail.
#[derive(Debug, Clone, Default)]
pub struct FakeHost {
    pub identity: OsIdentity,
    pub cpu_percent: Option<f64>,
    pub load: Option<LoadAverage>,
    pub memory: Option<MemoryInfo>,
    pub swap: Option<SwapInfo>,
    pub mounts: Option<Vec<MountPoint>>,
    /// Mount points whose usage query is refused
    pub denied_mounts: Vec<String>,
    pub network: Option<Vec<NetworkCounters>>,
    pub sensors: Option<Vec<SensorReading>>,
}

impl FakeHost {
    pub fn mount(path: &str, total: u64, available: u64) -> MountPoint {
        MountPoint {
            device: format!("/dev/{}", path.trim_start_matches('/').replace('/', "_")),
            mount_point: path.to_string(),
            file_system: "ext4".to_string(),
            total,
            available,
        }
    }
}

impl HostStats for FakeHost {
    fn os_identity(&self) -> OsIdentity {
        self.identity.clone()
    }

    fn cpu_percent(&self, _interval: Duration) -> Result<f64> {
        self.cpu_percent.ok_or_else(|| CoreError::query("cpu"))
    }

    fn load_average(&self) -> Result<LoadAverage> {
        self.load
            .ok_or_else(|| CoreError::unsupported_platform("load average"))
    }

    fn memory(&self) -> Result<MemoryInfo> {
        self.memory.ok_or_else(|| CoreError::query("memory"))
    }

    fn swap(&self) -> Result<SwapInfo> {
        self.swap.ok_or_else(|| CoreError::query("swap"))
    }

    fn mounts(&self) -> Result<Vec<MountPoint>> {
        self.mounts.clone().ok_or_else(|| CoreError::query("mounts"))
    }

    fn filesystem_usage(&self, mount: &MountPoint) -> Result<FilesystemUsage> {
        if self.denied_mounts.contains(&mount.mount_point) {
            return Err(CoreError::permission_denied(mount.mount_point.clone()));
        }

        Ok(FilesystemUsage {
            total: mount.total,
            used: mount.total - mount.available,
            free: mount.available,
        })
    }

    fn network_counters(&self) -> Result<Vec<NetworkCounters>> {
        self.network.clone().ok_or_else(|| CoreError::query("network"))
    }

    fn temperatures(&self) -> Result<Vec<SensorReading>> {
        self.sensors
            .clone()
            .ok_or_else(|| CoreError::unsupported_platform("sensors"))
    }
}

/// One fake GPU; `None` fields fail their query.
#[derive(Debug, Clone, Default)]
pub struct FakeGpu {
    pub name: Option<String>,
    pub uuid: Option<String>,
    pub memory: Option<GpuMemory>,
    pub utilization: Option<GpuUtilization>,
    pub temperature: Option<u32>,
    pub fan_speed: Option<u32>,
}

impl FakeGpu {
    pub fn healthy(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            uuid: Some(format!("GPU-{}", name.to_lowercase().replace(' ', "-"))),
            memory: Some(GpuMemory {
                total: 8_000,
                used: 3_000,
                free: 5_000,
            }),
            utilization: Some(GpuUtilization { core: 40, memory: 12 }),
            temperature: Some(55),
            fan_speed: Some(30),
        }
    }
}

/// Devices are `None` when their handle lookup fails.
#[derive(Debug, Clone, Default)]
pub struct FakeGpuSession {
    pub devices: Vec<Option<FakeGpu>>,
    pub count_fails: bool,
}

impl GpuSession for FakeGpuSession {
    fn device_count(&self) -> Result<u32> {
        if self.count_fails {
            return Err(CoreError::gpu("device count"));
        }
        Ok(self.devices.len() as u32)
    }

    fn device(&self, index: u32) -> Result<Box<dyn GpuDevice + '_>> {
        match self.devices.get(index as usize) {
            Some(Some(gpu)) => Ok(Box::new(gpu.clone())),
            _ => Err(CoreError::gpu(format!("no handle for {index}"))),
        }
    }
}

impl GpuDevice for FakeGpu {
    fn name(&self) -> Result<String> {
        self.name.clone().ok_or_else(|| CoreError::gpu("name"))
    }

    fn uuid(&self) -> Result<String> {
        self.uuid.clone().ok_or_else(|| CoreError::gpu("uuid"))
    }

    fn memory(&self) -> Result<GpuMemory> {
        self.memory.ok_or_else(|| CoreError::gpu("memory"))
    }

    fn utilization(&self) -> Result<GpuUtilization> {
        self.utilization.ok_or_else(|| CoreError::gpu("utilization"))
    }

    fn temperature(&self) -> Result<u32> {
        self.temperature.ok_or_else(|| CoreError::gpu("temperature"))
    }

    fn fan_speed(&self) -> Result<u32> {
        self.fan_speed.ok_or_else(|| CoreError::gpu("fan speed"))
    }
}

/// Scripted diagnostic tools. Outputs are keyed by `"<program> <args...>"`;
/// a missing key or a non-JSON output behaves like a failing run.
#[derive(Debug, Clone, Default)]
pub struct FakeTools {
    pub installed: Vec<String>,
    pub outputs: HashMap<String, String>,
}

impl FakeTools {
    pub fn with_output(mut self, command: &str, stdout: &str) -> Self {
        self.outputs.insert(command.to_string(), stdout.to_string());
        self
    }

    pub fn installed(mut self, program: &str) -> Self {
        self.installed.push(program.to_string());
        self
    }
}

impl DiagnosticTools for FakeTools {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        self.installed
            .iter()
            .any(|p| p == program)
            .then(|| PathBuf::from(program))
    }

    fn run_json(&self, program: &Path, args: &[&str]) -> Result<Value> {
        let mut key = program.display().to_string();
        for arg in args {
            key.push(' ');
            key.push_str(arg);
        }

        let stdout = self
            .outputs
            .get(&key)
            .ok_or_else(|| CoreError::tool(program.display().to_string(), "exit status: 1"))?;

        Ok(serde_json::from_str(stdout)?)
    }
}
