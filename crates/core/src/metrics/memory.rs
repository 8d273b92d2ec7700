use super::{Probe, ProbeResult};
use crate::{
    exposition::{MetricFamily, Precision, Sample},
    platform::HostStats,
};
use std::sync::Arc;
use tracing::debug;

/// RAM and swap, in bytes
pub struct MemoryProbe {
    host: Arc<dyn HostStats>,
}

impl MemoryProbe {
    pub fn new(host: Arc<dyn HostStats>) -> Self {
        Self { host }
    }
}

fn typed(family: &mut MetricFamily, kind: &str, value: u64) {
    family.push(Sample::new(value as f64).label("type", kind));
}

impl Probe for MemoryProbe {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn collect(&self) -> ProbeResult {
        let mut families = Vec::with_capacity(2);

        match self.host.memory() {
            Ok(vm) => {
                let mut family = MetricFamily::gauge(
                    "system_memory_bytes",
                    "System memory in bytes",
                    Precision::Integer,
                );
                typed(&mut family, "total", vm.total);
                typed(&mut family, "available", vm.available);
                typed(&mut family, "used", vm.used);
                typed(&mut family, "free", vm.free);
                families.push(family);
            }
            Err(e) => debug!("memory query failed: {}", e),
        }

        match self.host.swap() {
            Ok(swap) => {
                let mut family = MetricFamily::gauge(
                    "system_swap_bytes",
                    "Swap memory in bytes",
                    Precision::Integer,
                );
                typed(&mut family, "total", swap.total);
                typed(&mut family, "used", swap.used);
                typed(&mut family, "free", swap.free);
                families.push(family);
            }
            Err(e) => debug!("swap query failed: {}", e),
        }

        families
    }
}
