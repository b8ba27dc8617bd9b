use serde::Deserialize;
use std::time::Duration;

use crate::cache::resource::Resource;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsConfig {
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_path")]
    pub path: String,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            path: default_metrics_path(),
            is_enabled: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String, // allowed: trace, debug, info, warn, error
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(default_log_level(), LogFormat::default())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}

/// ================================
/// Upstream API
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// endpoint used to check a credential pair
    #[serde(default = "default_probe_path")]
    pub probe_path: String,
    /// carrier flight data
    #[serde(default = "default_primary_path")]
    pub primary_path: String,
    /// carrier updates
    #[serde(default = "default_secondary_path")]
    pub secondary_path: String,
    #[serde(default = "default_validate_timeout_ms")]
    pub validate_timeout_ms: u64,
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl UpstreamConfig {
    pub fn path_for(&self, resource: Resource) -> &str {
        match resource {
            Resource::Primary => &self.primary_path,
            Resource::Secondary => &self.secondary_path,
        }
    }

    pub fn validate_timeout(&self) -> Duration {
        Duration::from_millis(self.validate_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            probe_path: default_probe_path(),
            primary_path: default_primary_path(),
            secondary_path: default_secondary_path(),
            validate_timeout_ms: default_validate_timeout_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

/// ================================
/// Background refresh
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    /// invariant: > 0
    #[serde(default = "default_period_seconds")]
    pub period_seconds: u64,
}

impl RefreshConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_seconds)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            period_seconds: default_period_seconds(),
        }
    }
}

pub const CARRIERS: &str = "EI,BA,IB,VY,I2,AA,T2";

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> String {
    "3000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://api.daa.ie/dub/aops/flightdata/operational/v1".to_string()
}

fn default_probe_path() -> String {
    "/carrier/EI".to_string()
}

fn default_primary_path() -> String {
    format!("/carrier/{}", CARRIERS)
}

fn default_secondary_path() -> String {
    format!("/updates/carrier/{}", CARRIERS)
}

fn default_validate_timeout_ms() -> u64 {
    8_000
}

fn default_fetch_timeout_ms() -> u64 {
    15_000
}

fn default_period_seconds() -> u64 {
    60
}
