//! Configuration for the quota exporter.

use fuper_common::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete exporter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Upstream status page settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP endpoint settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Metric naming settings.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream status page configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Status page URL (default: "http://212.27.205.129/").
    #[serde(default = "default_url")]
    pub url: String,

    /// Seconds between refreshes (default: 600).
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Request timeout in seconds. Unset means the client's default (none).
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// User-Agent header sent upstream.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_url() -> String {
    "http://212.27.205.129/".to_string()
}

fn default_refresh_interval() -> u64 {
    600 // 10 minutes
}

fn default_user_agent() -> String {
    concat!("fuper-exporter/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            refresh_interval_secs: default_refresh_interval(),
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl SourceConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// HTTP endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Address to listen on (default: "0.0.0.0:5050").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Path for metrics endpoint (default: "/metrics").
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

fn default_listen() -> String {
    "0.0.0.0:5050".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            metrics_path: default_metrics_path(),
        }
    }
}

/// Metric naming configuration.
///
/// Every exported series is named `<namespace>_<subsystem>_<metric>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Metric namespace (default: "fuper").
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Metric subsystem (default: "mladeth").
    #[serde(default = "default_subsystem")]
    pub subsystem: String,
}

fn default_namespace() -> String {
    "fuper".to_string()
}

fn default_subsystem() -> String {
    "mladeth".to_string()
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            subsystem: default_subsystem(),
        }
    }
}

impl MetricsConfig {
    /// Prefix shared by all exported series.
    pub fn prefix(&self) -> String {
        format!("{}_{}", self.namespace, self.subsystem)
    }
}

/// Routes served besides `/` and the metrics path.
pub const BUILTIN_PATHS: &[&str] = &["/health", "/ready"];

/// Check a Prometheus name component: `[a-zA-Z_][a-zA-Z0-9_]*`.
fn is_valid_name_part(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl ExporterConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.source.url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "Source url must be http(s): {}",
                url
            )));
        }

        if self.source.refresh_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "refresh_interval_secs must be > 0".to_string(),
            ));
        }

        if self.source.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "timeout_secs must be > 0 when set".to_string(),
            ));
        }

        if self.http.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "Invalid listen address: {}",
                self.http.listen
            )));
        }

        if !self.http.metrics_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "Metrics path must start with /".to_string(),
            ));
        }

        // "/" serves the snapshot itself
        if self.http.metrics_path == "/" {
            return Err(ConfigError::Validation(
                "Metrics path must not be /".to_string(),
            ));
        }

        if BUILTIN_PATHS.contains(&self.http.metrics_path.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Metrics path conflicts with built-in route: {}",
                self.http.metrics_path
            )));
        }

        // The router would read these segments as captures or wildcards
        if self
            .http
            .metrics_path
            .split('/')
            .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
        {
            return Err(ConfigError::Validation(format!(
                "Metrics path must not contain : or * segments: {}",
                self.http.metrics_path
            )));
        }

        if !is_valid_name_part(&self.metrics.namespace) {
            return Err(ConfigError::Validation(format!(
                "Invalid metric namespace: {:?}",
                self.metrics.namespace
            )));
        }

        if !is_valid_name_part(&self.metrics.subsystem) {
            return Err(ConfigError::Validation(format!(
                "Invalid metric subsystem: {:?}",
                self.metrics.subsystem
            )));
        }

        Ok(())
    }
}
