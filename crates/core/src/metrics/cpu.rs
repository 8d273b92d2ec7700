use super::{Probe, ProbeResult};
use crate::{
    exposition::{MetricFamily, Precision, Sample},
    model::LoadAverage,
    platform::HostStats,
};
use std::{sync::Arc, time::Duration};
use tracing::debug;

/// CPU utilization plus 1/5/15-minute load averages
pub struct CpuProbe {
    host: Arc<dyn HostStats>,
    sample_interval: Duration,
}

impl CpuProbe {
    pub fn new(host: Arc<dyn HostStats>, sample_interval: Duration) -> Self {
        Self {
            host,
            sample_interval,
        }
    }
}

impl Probe for CpuProbe {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn collect(&self) -> ProbeResult {
        let mut families = Vec::with_capacity(2);

        // Blocks for the whole sample interval
        match self.host.cpu_percent(self.sample_interval) {
            Ok(percent) => families.push(
                MetricFamily::gauge(
                    "system_cpu_usage_percent",
                    "CPU utilization percentage",
                    Precision::Fixed(2),
                )
                .with_sample(Sample::new(percent)),
            ),
            Err(e) => debug!("CPU usage sample failed: {}", e),
        }

        // Hosts without load averages report zeros
        let load = self.host.load_average().unwrap_or_else(|e| {
            debug!("load average unavailable: {}", e);
            LoadAverage::default()
        });

        let mut load_family = MetricFamily::gauge(
            "system_load_average",
            "CPU load average over 1, 5, and 15 minutes",
            Precision::Fixed(2),
        );
        for (interval, value) in [("1m", load.one), ("5m", load.five), ("15m", load.fifteen)] {
            load_family.push(Sample::new(value).label("interval", interval));
        }
        families.push(load_family);

        families
    }
}
