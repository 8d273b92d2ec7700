use super::{Probe, ProbeResult};
use crate::{
    exposition::{MetricFamily, Precision, Sample},
    platform::HostStats,
};
use std::sync::Arc;

const UNKNOWN: &str = "unknown";

/// Host identity as a constant-1 info metric
pub struct SystemInfoProbe {
    host: Arc<dyn HostStats>,
}

impl SystemInfoProbe {
    pub fn new(host: Arc<dyn HostStats>) -> Self {
        Self { host }
    }
}

impl Probe for SystemInfoProbe {
    fn name(&self) -> &'static str {
        "system_info"
    }

    fn collect(&self) -> ProbeResult {
        let identity = self.host.os_identity();
        let field = |value: Option<String>| {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string())
        };

        let sample = Sample::new(1.0)
            .label("os", field(identity.os))
            .label("release", field(identity.release))
            .label("version", field(identity.version))
            .label("architecture", field(identity.architecture));

        vec![
            MetricFamily::gauge("system_info", "Basic host information", Precision::Integer)
                .with_sample(sample),
        ]
    }
}
