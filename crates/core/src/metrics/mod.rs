pub mod cpu;
pub mod disk;
pub mod disk_temperature;
pub mod gpu;
pub mod memory;
pub mod network;
pub mod system;
pub mod temperature;

pub use cpu::CpuProbe;
pub use disk::DiskProbe;
pub use disk_temperature::DiskTemperatureProbe;
pub use gpu::GpuProbe;
pub use memory::MemoryProbe;
pub use network::NetworkProbe;
pub use system::SystemInfoProbe;
pub use temperature::TemperatureProbe;

use crate::{
    config::Config,
    error::Result,
    exposition::{ExpositionDocument, MetricFamily},
    model::ProbeStatus,
    platform::{self, DiagnosticTools, GpuSession, HostStats, SysinfoHost, SystemTools},
};
use std::{sync::Arc, time::Instant};
use tracing::{debug, info};

/// What a probe hands back: empty means "nothing to report on this host".
pub type ProbeResult = Vec<MetricFamily>;

/// One independently-failing source of metric families.
///
/// `collect` never fails: data-source errors are absorbed inside the probe,
/// dropping only the measurement that failed.
pub trait Probe: Send + Sync {
    fn name(&self) -> &'static str;

    fn status(&self) -> ProbeStatus {
        ProbeStatus::Available
    }

    fn collect(&self) -> ProbeResult;
}

/// Runs every probe, in a fixed order, into one exposition document.
pub struct Collector {
    probes: Vec<Box<dyn Probe>>,
    disabled: Vec<&'static str>,
}

impl Collector {
    /// Build the production probe set. Fails only when host statistics are
    /// unavailable altogether.
    pub fn new(config: &Config) -> Result<Self> {
        let host: Arc<dyn HostStats> = Arc::new(SysinfoHost::new()?);

        let gpu = if config.gpu {
            match platform::gpu_session() {
                Ok(session) => Some(session),
                Err(e) if e.is_unavailable() => {
                    debug!("GPU driver not present: {}", e);
                    None
                }
                Err(e) => {
                    info!("GPU driver failed to initialize, GPU metrics disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Self::from_sources(
            config,
            host,
            Box::new(SystemTools::new()),
            gpu,
        ))
    }

    /// Build the standard probe set over explicit data sources.
    pub fn from_sources(
        config: &Config,
        host: Arc<dyn HostStats>,
        tools: Box<dyn DiagnosticTools>,
        gpu: Option<Box<dyn GpuSession>>,
    ) -> Self {
        let mut probes: Vec<Box<dyn Probe>> = vec![
            Box::new(SystemInfoProbe::new(host.clone())),
            Box::new(CpuProbe::new(host.clone(), config.cpu_sample_interval())),
            Box::new(MemoryProbe::new(host.clone())),
            Box::new(DiskProbe::new(host.clone())),
            Box::new(NetworkProbe::new(host.clone())),
            Box::new(TemperatureProbe::new(host)),
        ];
        let mut disabled = Vec::new();

        if config.disk_temperature {
            probes.push(Box::new(DiskTemperatureProbe::new(tools)));
        } else {
            disabled.push(disk_temperature::NAME);
        }

        if config.gpu {
            probes.push(Box::new(GpuProbe::new(gpu)));
        } else {
            disabled.push(gpu::NAME);
        }

        Self { probes, disabled }
    }

    /// Build from an explicit, already ordered probe list.
    pub fn with_probes(probes: Vec<Box<dyn Probe>>) -> Self {
        Self {
            probes,
            disabled: Vec::new(),
        }
    }

    pub fn probe_names(&self) -> Vec<&'static str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    pub fn probe_statuses(&self) -> Vec<(&'static str, ProbeStatus)> {
        self.probes
            .iter()
            .map(|p| (p.name(), p.status()))
            .chain(self.disabled.iter().map(|name| (*name, ProbeStatus::Disabled)))
            .collect()
    }

    /// Run every probe once and merge the results.
    pub fn collect(&self) -> ExpositionDocument {
        let start = Instant::now();
        let mut document = ExpositionDocument::new();

        for probe in &self.probes {
            let families = probe.collect();
            if families.is_empty() {
                debug!(probe = probe.name(), "probe reported nothing");
            }
            document.extend(families);
        }

        debug!(
            families = document.families().len(),
            samples = document.sample_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "collection finished"
        );

        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        exposition::{Precision, Sample},
        platform::fake::{FakeGpuSession, FakeHost, FakeTools},
    };

    struct StaticProbe {
        name: &'static str,
        families: Vec<MetricFamily>,
    }

    impl Probe for StaticProbe {
        fn name(&self) -> &'static str {
            self.name
        }

        fn collect(&self) -> ProbeResult {
            self.families.clone()
        }
    }

    fn family(name: &str, value: f64) -> MetricFamily {
        MetricFamily::gauge(name, "test", Precision::Integer).with_sample(Sample::new(value))
    }

    #[test]
    fn test_collect_preserves_probe_order() {
        let collector = Collector::with_probes(vec![
            Box::new(StaticProbe {
                name: "b",
                families: vec![family("b_metric", 1.0)],
            }),
            Box::new(StaticProbe {
                name: "empty",
                families: vec![],
            }),
            Box::new(StaticProbe {
                name: "a",
                families: vec![family("a_metric", 2.0)],
            }),
        ]);

        let doc = collector.collect();
        let names: Vec<&str> = doc.families().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["b_metric", "a_metric"]);
    }

    #[test]
    fn test_standard_probe_order() {
        let host: Arc<dyn HostStats> = Arc::new(FakeHost::default());
        let collector = Collector::from_sources(
            &Config::default(),
            host,
            Box::new(FakeTools::default()),
            None,
        );

        assert_eq!(
            collector.probe_names(),
            [
                "system_info",
                "cpu",
                "memory",
                "disk",
                "network",
                "temperature",
                "disk_temperature",
                "gpu"
            ]
        );
    }

    #[test]
    fn test_disabled_probes_are_reported() {
        let config = Config {
            gpu: false,
            disk_temperature: false,
            ..Config::default()
        };
        let host: Arc<dyn HostStats> = Arc::new(FakeHost::default());
        let collector =
            Collector::from_sources(&config, host, Box::new(FakeTools::default()), None);

        assert!(!collector.probe_names().contains(&"gpu"));
        let statuses = collector.probe_statuses();
        assert!(statuses.contains(&("gpu", ProbeStatus::Disabled)));
        assert!(statuses.contains(&("disk_temperature", ProbeStatus::Disabled)));
    }

    #[test]
    fn test_missing_sources_do_not_affect_others() {
        let host = FakeHost {
            memory: Some(crate::model::MemoryInfo {
                total: 4,
                available: 3,
                used: 1,
                free: 2,
            }),
            ..FakeHost::default()
        };
        let collector = Collector::from_sources(
            &Config::default(),
            Arc::new(host),
            Box::new(FakeTools::default()),
            Some(Box::new(FakeGpuSession {
                count_fails: true,
                ..FakeGpuSession::default()
            })),
        );

        let doc = collector.collect();
        assert!(doc.family("system_info").is_some());
        assert!(doc.family("system_memory_bytes").is_some());
        assert!(doc.family("system_cpu_usage_percent").is_none());
        assert!(doc.family("system_temperature_celsius").is_none());
        assert!(doc.family("system_disk_temperature_celsius").is_none());
        assert!(!doc.render().contains("system_gpu_"));
    }
}
