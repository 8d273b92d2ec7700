use super::{Probe, ProbeResult};
use crate::{
    exposition::{MetricFamily, Precision, Sample},
    platform::HostStats,
};
use std::sync::Arc;
use tracing::debug;

/// Hardware sensor temperatures in Celsius
pub struct TemperatureProbe {
    host: Arc<dyn HostStats>,
}

impl TemperatureProbe {
    pub fn new(host: Arc<dyn HostStats>) -> Self {
        Self { host }
    }
}

impl Probe for TemperatureProbe {
    fn name(&self) -> &'static str {
        "temperature"
    }

    fn collect(&self) -> ProbeResult {
        let readings = match self.host.temperatures() {
            Ok(readings) => readings,
            Err(e) => {
                debug!("temperature sensors unavailable: {}", e);
                return Vec::new();
            }
        };

        let mut family = MetricFamily::gauge(
            "system_temperature_celsius",
            "Reported temperature sensors",
            Precision::Fixed(2),
        );

        for reading in &readings {
            let Some(current) = reading.current else {
                continue;
            };
            let sensor = reading
                .label
                .as_deref()
                .filter(|l| !l.is_empty())
                .unwrap_or(reading.chip.as_str());

            family.push(
                Sample::new(current)
                    .label("name", reading.chip.as_str())
                    .label("sensor", sensor),
            );
        }

        // Header alone is not worth emitting
        if family.is_empty() {
            return Vec::new();
        }

        vec![family]
    }
}
