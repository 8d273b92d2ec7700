//! Storage device temperatures from `nvme-cli` and `smartctl`.
//!
//! Both tools are located once, when the probe is built. A tool that is not
//! installed is skipped for the life of the process; a device whose query
//! fails, or whose output has no temperature, is skipped on its own.

use super::{Probe, ProbeResult};
use crate::{
    exposition::{MetricFamily, Precision, Sample},
    model::ProbeStatus,
    platform::DiagnosticTools,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const NAME: &str = "disk_temperature";

const NVME: &str = "nvme";
const SMARTCTL: &str = "smartctl";

/// nvme-cli reports the composite temperature in Kelvin; no drive reads this hot in Celsius.
const KELVIN_THRESHOLD: f64 = 200.0;
/// nvme-cli works in whole Kelvin and converts with this offset.
const KELVIN_OFFSET: f64 = 273.0;

pub struct DiskTemperatureProbe {
    tools: Box<dyn DiagnosticTools>,
    nvme: Option<PathBuf>,
    smartctl: Option<PathBuf>,
}

impl DiskTemperatureProbe {
    pub fn new(tools: Box<dyn DiagnosticTools>) -> Self {
        let nvme = tools.locate(NVME);
        let smartctl = tools.locate(SMARTCTL);
        debug!(nvme = ?nvme, smartctl = ?smartctl, "located storage diagnostic tools");

        Self {
            tools,
            nvme,
            smartctl,
        }
    }

    fn run(&self, program: &Path, args: &[&str]) -> Option<Value> {
        match self.tools.run_json(program, args) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(program = %program.display(), ?args, "diagnostic tool gave no data: {}", e);
                None
            }
        }
    }

    fn collect_nvme(&self, nvme: &Path, family: &mut MetricFamily) {
        let Some(list) = self.run(nvme, &["list", "-o", "json"]) else {
            return;
        };

        for device in json_array(&list, "Devices") {
            let Some(path) = json_str(device, "DevicePath").or_else(|| json_str(device, "Name")) else {
                continue;
            };

            let temperature = self
                .run(nvme, &["smart-log", "-o", "json", path])
                .and_then(|log| first_reading(&log, &["temperature", "composite_temperature"]))
                .map(kelvin_to_celsius);

            match temperature {
                Some(celsius) => family.push(device_sample(path, "nvme", celsius)),
                None => debug!(device = path, "no NVMe temperature reported"),
            }
        }
    }

    fn collect_smart(&self, smartctl: &Path, family: &mut MetricFamily) {
        let Some(scan) = self.run(smartctl, &["--scan-open", "-j"]) else {
            return;
        };

        for device in json_array(&scan, "devices") {
            let Some(name) = json_str(device, "name") else {
                continue;
            };

            let temperature = self
                .run(smartctl, &["-Aj", name])
                .and_then(|info| {
                    info.get("temperature")
                        .and_then(|t| first_reading(t, &["current", "drive_temperature"]))
                });

            match temperature {
                Some(celsius) => family.push(device_sample(name, "smart", celsius)),
                None => debug!(device = name, "no SMART temperature reported"),
            }
        }
    }
}

impl Probe for DiskTemperatureProbe {
    fn name(&self) -> &'static str {
        NAME
    }

    fn status(&self) -> ProbeStatus {
        if self.nvme.is_some() || self.smartctl.is_some() {
            ProbeStatus::Available
        } else {
            ProbeStatus::Unavailable
        }
    }

    fn collect(&self) -> ProbeResult {
        let mut family = MetricFamily::gauge(
            "system_disk_temperature_celsius",
            "Storage temperature readings",
            Precision::Integer,
        );

        if let Some(nvme) = &self.nvme {
            self.collect_nvme(nvme, &mut family);
        }
        if let Some(smartctl) = &self.smartctl {
            self.collect_smart(smartctl, &mut family);
        }

        if family.is_empty() {
            return Vec::new();
        }
        vec![family]
    }
}

fn device_sample(device: &str, kind: &str, celsius: f64) -> Sample {
    Sample::new(celsius).label("device", device).label("type", kind)
}

fn json_array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn json_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// First key holding a non-zero number. Zero means "not reported" to both tools.
fn first_reading(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_f64))
        .find(|reading| *reading != 0.0)
}

fn kelvin_to_celsius(reading: f64) -> f64 {
    if reading >= KELVIN_THRESHOLD {
        reading - KELVIN_OFFSET
    } else {
        reading
    }
}
