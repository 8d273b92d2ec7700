use super::HostStats;
use crate::{
    error::{CoreError, Result},
    model::{
        FilesystemUsage, LoadAverage, MemoryInfo, MountPoint, NetworkCounters, OsIdentity,
        SensorReading, SwapInfo,
    },
};
use std::{thread, time::Duration};
use sysinfo::{Components, Disks, Networks, System};

/// `HostStats` backed by `sysinfo`.
///
/// Every call builds fresh `sysinfo` state, so the provider holds nothing
/// mutable and can be shared between concurrent scrapes.
pub struct SysinfoHost {
    _private: (),
}

impl SysinfoHost {
    pub fn new() -> Result<Self> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(CoreError::host_stats(format!(
                "sysinfo does not support {}",
                std::env::consts::OS
            )));
        }

        Ok(Self { _private: () })
    }
}

impl HostStats for SysinfoHost {
    #[cfg(unix)]
    fn os_identity(&self) -> OsIdentity {
        match nix::sys::utsname::uname() {
            Ok(uts) => uname_identity(
                &uts.sysname().to_string_lossy(),
                &uts.release().to_string_lossy(),
                &uts.version().to_string_lossy(),
                &uts.machine().to_string_lossy(),
            ),
            Err(e) => {
                tracing::debug!("uname failed, falling back to sysinfo: {}", e);
                sysinfo_identity()
            }
        }
    }

    #[cfg(not(unix))]
    fn os_identity(&self) -> OsIdentity {
        sysinfo_identity()
    }

    fn cpu_percent(&self, interval: Duration) -> Result<f64> {
        let mut sys = System::new();
        sys.refresh_cpu();
        if sys.cpus().is_empty() {
            return Err(CoreError::query("no CPUs reported"));
        }

        // Usage is the delta between two refreshes
        thread::sleep(interval);
        sys.refresh_cpu();

        Ok(f64::from(sys.global_cpu_info().cpu_usage()))
    }

    #[cfg(unix)]
    fn load_average(&self) -> Result<LoadAverage> {
        let load_avg = System::load_average();
        Ok(LoadAverage {
            one: load_avg.one,
            five: load_avg.five,
            fifteen: load_avg.fifteen,
        })
    }

    #[cfg(not(unix))]
    fn load_average(&self) -> Result<LoadAverage> {
        Err(CoreError::unsupported_platform("load average"))
    }

    fn memory(&self) -> Result<MemoryInfo> {
        let mut sys = System::new();
        sys.refresh_memory();

        let total = sys.total_memory();
        if total == 0 {
            return Err(CoreError::query("total memory reported as zero"));
        }

        Ok(MemoryInfo {
            total,
            available: sys.available_memory(),
            used: sys.used_memory(),
            free: sys.free_memory(),
        })
    }

    fn swap(&self) -> Result<SwapInfo> {
        let mut sys = System::new();
        sys.refresh_memory();

        Ok(SwapInfo {
            total: sys.total_swap(),
            used: sys.used_swap(),
            free: sys.free_swap(),
        })
    }

    fn mounts(&self) -> Result<Vec<MountPoint>> {
        let disks = Disks::new_with_refreshed_list();

        let mut mounts = Vec::new();
        for disk in &disks {
            mounts.push(MountPoint {
                device: disk.name().to_string_lossy().to_string(),
                mount_point: disk.mount_point().to_string_lossy().to_string(),
                file_system: disk.file_system().to_string_lossy().to_string(),
                total: disk.total_space(),
                available: disk.available_space(),
            });
        }

        Ok(mounts)
    }

    #[cfg(unix)]
    fn filesystem_usage(&self, mount: &MountPoint) -> Result<FilesystemUsage> {
        use nix::sys::statvfs::statvfs;

        let stat = statvfs(mount.mount_point.as_str()).map_err(|errno| match errno {
            nix::errno::Errno::EACCES | nix::errno::Errno::EPERM => {
                CoreError::permission_denied(mount.mount_point.clone())
            }
            other => CoreError::from(other),
        })?;

        let fragment = stat.fragment_size() as u64;
        let blocks = stat.blocks() as u64;

        Ok(FilesystemUsage {
            total: blocks * fragment,
            used: blocks.saturating_sub(stat.blocks_free() as u64) * fragment,
            free: stat.blocks_available() as u64 * fragment,
        })
    }

    #[cfg(not(unix))]
    fn filesystem_usage(&self, mount: &MountPoint) -> Result<FilesystemUsage> {
        // No statvfs; use the capacity captured when the mount was listed
        if mount.total == 0 {
            return Err(CoreError::query(format!(
                "no capacity reported for {}",
                mount.mount_point
            )));
        }

        Ok(FilesystemUsage {
            total: mount.total,
            used: mount.total.saturating_sub(mount.available),
            free: mount.available,
        })
    }

    fn network_counters(&self) -> Result<Vec<NetworkCounters>> {
        let networks = Networks::new_with_refreshed_list();

        let mut counters = Vec::new();
        for (interface, data) in &networks {
            counters.push(NetworkCounters {
                interface: interface.clone(),
                bytes_sent: data.total_transmitted(),
                bytes_received: data.total_received(),
            });
        }

        // sysinfo keeps interfaces in a hash map
        counters.sort_by(|a, b| a.interface.cmp(&b.interface));
        Ok(counters)
    }

    fn temperatures(&self) -> Result<Vec<SensorReading>> {
        let components = Components::new_with_refreshed_list();

        let mut readings = Vec::new();
        for component in &components {
            let temperature = component.temperature();
            readings.push(split_component_label(
                component.label(),
                temperature.is_finite().then_some(f64::from(temperature)),
            ));
        }

        Ok(readings)
    }
}

/// Kernel identity as `uname(2)` reports it; blank fields become `None`.
#[cfg(unix)]
fn uname_identity(sysname: &str, release: &str, version: &str, machine: &str) -> OsIdentity {
    let field = |value: &str| Some(value.trim().to_string()).filter(|v| !v.is_empty());

    OsIdentity {
        os: field(sysname),
        release: field(release),
        version: field(version),
        architecture: field(machine),
    }
}

fn sysinfo_identity() -> OsIdentity {
    let architecture = Some(std::env::consts::ARCH.to_string()).filter(|a| !a.is_empty());

    OsIdentity {
        os: System::name(),
        release: System::kernel_version(),
        version: System::os_version(),
        architecture,
    }
}

/// sysinfo labels components as `"<chip> <sensor>"`; split them back apart.
fn split_component_label(label: &str, current: Option<f64>) -> SensorReading {
    let label = label.trim();
    match label.split_once(' ') {
        Some((chip, sensor)) if !sensor.trim().is_empty() => SensorReading {
            chip: chip.to_string(),
            label: Some(sensor.trim().to_string()),
            current,
        },
        _ => SensorReading {
            chip: label.to_string(),
            label: None,
            current,
        },
    }
}
