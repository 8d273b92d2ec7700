use super::{Probe, ProbeResult};
use crate::{
    exposition::{MetricFamily, Sample},
    platform::HostStats,
};
use std::sync::Arc;
use tracing::debug;

/// Cumulative bytes sent and received per network interface
pub struct NetworkProbe {
    host: Arc<dyn HostStats>,
}

impl NetworkProbe {
    pub fn new(host: Arc<dyn HostStats>) -> Self {
        Self { host }
    }
}

impl Probe for NetworkProbe {
    fn name(&self) -> &'static str {
        "network"
    }

    fn collect(&self) -> ProbeResult {
        let counters = match self.host.network_counters() {
            Ok(counters) => counters,
            Err(e) => {
                debug!("network counters unavailable: {}", e);
                return Vec::new();
            }
        };

        let mut family = MetricFamily::counter(
            "system_network_bytes_total",
            "Total bytes sent/received per interface",
        );

        for iface in &counters {
            family.push(
                Sample::new(iface.bytes_sent as f64)
                    .label("interface", iface.interface.as_str())
                    .label("direction", "sent"),
            );
            family.push(
                Sample::new(iface.bytes_received as f64)
                    .label("interface", iface.interface.as_str())
                    .label("direction", "received"),
            );
        }

        vec![family]
    }
}
