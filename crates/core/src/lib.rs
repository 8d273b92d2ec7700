//! Host telemetry probes and Prometheus text rendering.

pub mod config;
pub mod error;
pub mod exposition;
pub mod metrics;
pub mod model;
pub mod platform;

pub use config::{CliConfig, Config};
pub use error::{CoreError, Result};
pub use exposition::{ExpositionDocument, MetricFamily, MetricKind, Precision, Sample, CONTENT_TYPE};
pub use metrics::{Collector, Probe, ProbeResult};
pub use model::*;
pub use platform::{DiagnosticTools, GpuDevice, GpuSession, HostStats};
