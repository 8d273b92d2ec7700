use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, warn};

/// Exporter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind: String,

    /// Port the HTTP server listens on
    pub port: u16,

    /// Path serving the exposition document
    pub metrics_path: String,

    /// Blocking CPU sample window in milliseconds
    pub cpu_sample_ms: u64,

    /// Query nvme-cli/smartctl for storage temperatures
    pub disk_temperature: bool,

    /// Open a GPU driver session for GPU metrics
    pub gpu: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 9105,
            metrics_path: "/metrics".to_string(),
            cpu_sample_ms: 200,
            disk_temperature: true,
            gpu: true,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources in order of preference:
    /// 1. CLI arguments override everything
    /// 2. JSON config file if specified
    /// 3. Default config file locations
    /// 4. Built-in defaults
    pub fn load(cli_config: Option<&CliConfig>, json_path: Option<&PathBuf>) -> Result<Self> {
        Self::load_layered(&Self::default_config_paths(), cli_config, json_path)
    }

    /// `load` over an explicit list of default file locations
    fn load_layered(
        default_paths: &[PathBuf],
        cli_config: Option<&CliConfig>,
        json_path: Option<&PathBuf>,
    ) -> Result<Self> {
        let mut config = Self::default();

        if let Some(default_layer) = Self::load_default_layer(default_paths) {
            config.merge(default_layer);
        }

        if let Some(path) = json_path {
            config.merge(ConfigLayer::load(path)?);
        }

        if let Some(cli) = cli_config {
            config.apply_cli_overrides(cli);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a complete configuration from a specific JSON file; fields the
    /// file leaves out keep their defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge(ConfigLayer::load(path)?);
        Ok(config)
    }

    /// First readable file among the default locations
    fn load_default_layer(paths: &[PathBuf]) -> Option<ConfigLayer> {
        for path in paths {
            if path.exists() {
                match ConfigLayer::load(path) {
                    Ok(layer) => return Some(layer),
                    Err(e) => {
                        warn!("Failed to load config from {}: {}", path.display(), e);
                        continue;
                    }
                }
            }
        }

        None
    }

    /// Get default configuration file search paths
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("hostprobe").join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".hostprobe.json"));
        }

        paths.push(PathBuf::from("hostprobe.json"));

        paths
    }

    /// Apply every field the layer sets, including ones equal to the default
    fn merge(&mut self, layer: ConfigLayer) {
        if let Some(bind) = layer.bind {
            self.bind = bind;
        }
        if let Some(port) = layer.port {
            self.port = port;
        }
        if let Some(metrics_path) = layer.metrics_path {
            self.metrics_path = metrics_path;
        }
        if let Some(cpu_sample_ms) = layer.cpu_sample_ms {
            self.cpu_sample_ms = cpu_sample_ms;
        }
        if let Some(disk_temperature) = layer.disk_temperature {
            self.disk_temperature = disk_temperature;
        }
        if let Some(gpu) = layer.gpu {
            self.gpu = gpu;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &CliConfig) {
        if let Some(bind) = &cli.bind {
            self.bind = bind.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.bind.parse::<IpAddr>().is_err() {
            return Err(CoreError::config(format!(
                "Bind address {:?} is not an IP address",
                self.bind
            )));
        }

        if self.port == 0 {
            return Err(CoreError::config("Port must be non-zero"));
        }

        if !self.metrics_path.starts_with('/') {
            return Err(CoreError::config(format!(
                "Metrics path {:?} must start with '/'",
                self.metrics_path
            )));
        }

        // Route syntax would turn the path into a capture or wildcard
        if self.metrics_path.contains([':', '*', '{', '}']) {
            return Err(CoreError::config(format!(
                "Metrics path {:?} must not contain ':', '*', '{{' or '}}'",
                self.metrics_path
            )));
        }

        let minimum = sysinfo::MINIMUM_CPU_UPDATE_INTERVAL.as_millis() as u64;
        if self.cpu_sample_ms < minimum {
            return Err(CoreError::config(format!(
                "CPU sample interval must be at least {}ms",
                minimum
            )));
        }

        if self.cpu_sample_ms > 5000 {
            return Err(CoreError::config("CPU sample interval must be at most 5 seconds"));
        }

        Ok(())
    }

    /// Socket address for the HTTP server
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .bind
            .parse()
            .map_err(|e| CoreError::config(format!("Invalid bind address {}: {}", self.bind, e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Get the CPU sample window as Duration
    pub fn cpu_sample_interval(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_ms)
    }
}

/// One configuration file; fields it leaves out are `None`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    bind: Option<String>,
    port: Option<u16>,
    metrics_path: Option<String>,
    cpu_sample_ms: Option<u64>,
    disk_temperature: Option<bool>,
    gpu: Option<bool>,
}

impl ConfigLayer {
    fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CoreError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let layer: Self = serde_json::from_str(&contents).map_err(|e| {
            CoreError::config(format!("Failed to parse config file {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), "loaded config file");
        Ok(layer)
    }
}

/// CLI configuration (temporary struct for CLI parsing)
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_addr().unwrap().to_string(), "0.0.0.0:9105");
        assert_eq!(config.cpu_sample_interval(), Duration::from_millis(200));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"port": 9200, "bind": "127.0.0.1", "gpu": false}}"#).unwrap();

        let cli = CliConfig {
            bind: None,
            port: Some(9300),
        };
        let config = Config::load(Some(&cli), Some(&file.path().to_path_buf())).unwrap();

        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.port, 9300);
        assert!(!config.gpu);
        assert!(config.disk_temperature);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"cpu_sample_ms": 500}}"#).unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.cpu_sample_ms, 500);
        assert_eq!(config.port, 9105);
        assert_eq!(config.metrics_path, "/metrics");
    }

    #[test]
    fn test_unparseable_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "port = 1").unwrap();

        let err = Config::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_validation() {
        let bad = [
            Config {
                bind: "not-an-ip".into(),
                ..Config::default()
            },
            Config {
                port: 0,
                ..Config::default()
            },
            Config {
                metrics_path: "metrics".into(),
                ..Config::default()
            },
            Config {
                metrics_path: "/:section".into(),
                ..Config::default()
            },
            Config {
                metrics_path: "/metrics/*rest".into(),
                ..Config::default()
            },
            Config {
                metrics_path: "/{name}".into(),
                ..Config::default()
            },
            Config {
                cpu_sample_ms: 10,
                ..Config::default()
            },
            Config {
                cpu_sample_ms: 60_000,
                ..Config::default()
            },
        ];

        for config in &bad {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn test_json_config_resets_default_file_values() {
        let default_file = write_config(r#"{"port": 9200, "gpu": false, "cpu_sample_ms": 1000}"#);
        let json_file = write_config(r#"{"port": 9105, "gpu": true}"#);

        let config = Config::load_layered(
            &[default_file.path().to_path_buf()],
            None,
            Some(&json_file.path().to_path_buf()),
        )
        .unwrap();

        assert_eq!(config.port, 9105);
        assert!(config.gpu);
        assert_eq!(config.cpu_sample_ms, 1000);
    }

    #[test]
    fn test_first_readable_default_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let broken = write_config("{ not json");
        let first = write_config(r#"{"bind": "127.0.0.1"}"#);
        let second = write_config(r#"{"bind": "10.0.0.1", "port": 9300}"#);

        let config = Config::load_layered(
            &[
                dir.path().join("missing.json"),
                broken.path().to_path_buf(),
                first.path().to_path_buf(),
                second.path().to_path_buf(),
            ],
            None,
            None,
        )
        .unwrap();

        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.port, 9105);
    }

    #[test]
    fn test_sample_interval_respects_provider_minimum() {
        let minimum = sysinfo::MINIMUM_CPU_UPDATE_INTERVAL.as_millis() as u64;
        let at_minimum = Config {
            cpu_sample_ms: minimum,
            ..Config::default()
        };
        assert!(at_minimum.validate().is_ok());

        if minimum > 0 {
            let below = Config {
                cpu_sample_ms: minimum - 1,
                ..Config::default()
            };
            assert!(below.validate().is_err());
        }
    }

    #[test]
    fn test_ipv6_listen_addr() {
        let config = Config {
            bind: "::1".into(),
            ..Config::default()
        };
        assert_eq!(config.listen_addr().unwrap().to_string(), "[::1]:9105");
    }
}
