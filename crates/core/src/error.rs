use thiserror::Error;

/// Core errors for the exporter
#[derive(Error, Debug)]
pub enum CoreError {
    /// No host statistics provider could be obtained. Fatal at startup.
    #[error("Host statistics unavailable: {0}")]
    HostStats(String),

    /// A data source (driver, sensor API, binary) does not exist on this host.
    #[error("Data source unavailable: {0}")]
    SourceUnavailable(String),

    /// A present data source failed for one measurement.
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Diagnostic tool {tool} failed: {reason}")]
    Tool { tool: String, reason: String },

    #[error("GPU driver error: {0}")]
    Gpu(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Feature not supported on this platform: {0}")]
    UnsupportedPlatform(String),

    #[cfg(unix)]
    #[error("Unix system error: {0}")]
    Unix(#[from] nix::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn host_stats<S: Into<String>>(msg: S) -> Self {
        Self::HostStats(msg.into())
    }

    pub fn source_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    pub fn query<S: Into<String>>(msg: S) -> Self {
        Self::Query(msg.into())
    }

    pub fn tool<T: Into<String>, R: Into<String>>(tool: T, reason: R) -> Self {
        Self::Tool {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    pub fn gpu<S: Into<String>>(msg: S) -> Self {
        Self::Gpu(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn permission_denied<S: Into<String>>(msg: S) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn unsupported_platform<S: Into<String>>(msg: S) -> Self {
        Self::UnsupportedPlatform(msg.into())
    }

    /// True when the error means the source is absent rather than broken.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable(_) | Self::UnsupportedPlatform(_)
        )
    }

    /// True for permission failures, including raw OS errors.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::PermissionDenied(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::PermissionDenied,
            #[cfg(unix)]
            Self::Unix(errno) => matches!(errno, nix::errno::Errno::EACCES | nix::errno::Errno::EPERM),
            _ => false,
        }
    }
}
