use super::{Probe, ProbeResult};
use crate::{
    exposition::{MetricFamily, Precision, Sample},
    model::ProbeStatus,
    platform::{GpuDevice, GpuSession},
};
use tracing::debug;

pub const NAME: &str = "gpu";

/// Per-device GPU metrics from a driver session opened at startup.
///
/// Without a session the probe reports nothing for the life of the process.
pub struct GpuProbe {
    session: Option<Box<dyn GpuSession>>,
}

struct GpuFamilies {
    info: MetricFamily,
    memory: MetricFamily,
    utilization: MetricFamily,
    temperature: MetricFamily,
    fan_speed: MetricFamily,
}

impl GpuFamilies {
    fn new() -> Self {
        Self {
            info: MetricFamily::gauge("system_gpu_info", "GPU device information", Precision::Integer),
            memory: MetricFamily::gauge(
                "system_gpu_memory_bytes",
                "GPU memory usage in bytes",
                Precision::Integer,
            ),
            utilization: MetricFamily::gauge(
                "system_gpu_utilization_percent",
                "GPU utilization percent",
                Precision::Integer,
            ),
            temperature: MetricFamily::gauge(
                "system_gpu_temperature_celsius",
                "GPU temperature in Celsius",
                Precision::Integer,
            ),
            fan_speed: MetricFamily::gauge(
                "system_gpu_fan_speed_percent",
                "GPU fan speed percentage",
                Precision::Integer,
            ),
        }
    }

    fn into_vec(self) -> Vec<MetricFamily> {
        vec![
            self.info,
            self.memory,
            self.utilization,
            self.temperature,
            self.fan_speed,
        ]
    }
}

impl GpuProbe {
    pub fn new(session: Option<Box<dyn GpuSession>>) -> Self {
        Self { session }
    }

    fn collect_device(index: u32, device: &dyn GpuDevice, families: &mut GpuFamilies) {
        let idx = index.to_string();
        let or_unknown = |value: crate::error::Result<String>, what: &str| {
            value.unwrap_or_else(|e| {
                debug!(index, "GPU {} query failed: {}", what, e);
                "unknown".to_string()
            })
        };

        let name = or_unknown(device.name(), "name");
        let uuid = or_unknown(device.uuid(), "uuid");
        families.info.push(
            Sample::new(1.0)
                .label("index", idx.as_str())
                .label("name", name)
                .label("uuid", uuid),
        );

        match device.memory() {
            Ok(mem) => {
                for (kind, value) in [("total", mem.total), ("used", mem.used), ("free", mem.free)] {
                    families.memory.push(
                        Sample::new(value as f64)
                            .label("index", idx.as_str())
                            .label("type", kind),
                    );
                }
            }
            Err(e) => debug!(index, "GPU memory query failed: {}", e),
        }

        match device.utilization() {
            Ok(util) => {
                for (kind, value) in [("core", util.core), ("memory", util.memory)] {
                    families.utilization.push(
                        Sample::new(f64::from(value))
                            .label("index", idx.as_str())
                            .label("type", kind),
                    );
                }
            }
            Err(e) => debug!(index, "GPU utilization query failed: {}", e),
        }

        match device.temperature() {
            Ok(temp) => families
                .temperature
                .push(Sample::new(f64::from(temp)).label("index", idx.as_str())),
            Err(e) => debug!(index, "GPU temperature query failed: {}", e),
        }

        match device.fan_speed() {
            Ok(speed) => families
                .fan_speed
                .push(Sample::new(f64::from(speed)).label("index", idx.as_str())),
            Err(e) => debug!(index, "GPU fan speed query failed: {}", e),
        }
    }
}

impl Probe for GpuProbe {
    fn name(&self) -> &'static str {
        NAME
    }

    fn status(&self) -> ProbeStatus {
        if self.session.is_some() {
            ProbeStatus::Available
        } else {
            ProbeStatus::Unavailable
        }
    }

    fn collect(&self) -> ProbeResult {
        let Some(session) = &self.session else {
            return Vec::new();
        };

        let count = match session.device_count() {
            Ok(count) => count,
            Err(e) => {
                debug!("GPU device count failed: {}", e);
                return Vec::new();
            }
        };

        let mut families = GpuFamilies::new();
        for index in 0..count {
            match session.device(index) {
                Ok(device) => Self::collect_device(index, device.as_ref(), &mut families),
                Err(e) => debug!(index, "GPU handle unavailable: {}", e),
            }
        }

        families.into_vec()
    }
}
