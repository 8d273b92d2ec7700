use super::{Probe, ProbeResult};
use crate::{
    exposition::{MetricFamily, Precision, Sample},
    platform::HostStats,
};
use std::sync::Arc;
use tracing::debug;

/// Filesystem capacity and usage per mounted filesystem
pub struct DiskProbe {
    host: Arc<dyn HostStats>,
}

impl DiskProbe {
    pub fn new(host: Arc<dyn HostStats>) -> Self {
        Self { host }
    }
}

impl Probe for DiskProbe {
    fn name(&self) -> &'static str {
        "disk"
    }

    fn collect(&self) -> ProbeResult {
        let mounts = match self.host.mounts() {
            Ok(mounts) => mounts,
            Err(e) => {
                debug!("listing mounts failed: {}", e);
                return Vec::new();
            }
        };

        let mut family = MetricFamily::gauge(
            "system_filesystem_bytes",
            "Filesystem capacity and usage in bytes",
            Precision::Integer,
        );

        for mount in &mounts {
            let usage = match self.host.filesystem_usage(mount) {
                Ok(usage) => usage,
                Err(e) if e.is_permission_denied() => {
                    debug!(mount = %mount.mount_point, "skipping mount: {}", e);
                    continue;
                }
                Err(e) => {
                    debug!(mount = %mount.mount_point, "usage query failed: {}", e);
                    continue;
                }
            };

            for (kind, value) in [("total", usage.total), ("used", usage.used), ("free", usage.free)] {
                family.push(
                    Sample::new(value as f64)
                        .label("mount", mount.mount_point.as_str())
                        .label("type", kind),
                );
            }
        }

        vec![family]
    }
}
