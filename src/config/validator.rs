//! Configuration validation with aggregated errors.
//! Every issue is collected so a broken file is reported in one pass.

use tracing::{error, info};

use crate::config::settings::{
    LoggingConfig, MetricsConfig, RefreshConfig, ServerConfig, ServiceConfig, UpstreamConfig,
};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_server(&cfg.settings.server, &mut errors);
    validate_logging(&cfg.settings.logging, &mut errors);
    validate_metrics(&cfg.settings.metrics, &mut errors);
    validate_upstream(&cfg.upstream, &mut errors);
    validate_refresh(&cfg.refresh, &mut errors);

    if errors.is_empty() {
        info!("config is valid");
        Ok(())
    } else {
        for e in &errors {
            error!("config: {}", e);
        }
        Err(errors)
    }
}

fn validate_server(server: &ServerConfig, errors: &mut Vec<String>) {
    if server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' is not a valid port",
            server.port
        ));
    }
}

fn validate_logging(logging: &LoggingConfig, errors: &mut Vec<String>) {
    if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
        errors.push(format!(
            "settings.logging.level '{}' must be one of {:?}",
            logging.level, LOG_LEVELS
        ));
    }
}

fn validate_metrics(metrics: &MetricsConfig, errors: &mut Vec<String>) {
    if metrics.is_enabled && !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }
}

fn validate_upstream(upstream: &UpstreamConfig, errors: &mut Vec<String>) {
    if !(upstream.base_url.starts_with("http://") || upstream.base_url.starts_with("https://")) {
        errors.push(format!(
            "upstream.base_url '{}' must start with http:// or https://",
            upstream.base_url
        ));
    }

    for (name, path) in [
        ("probe_path", &upstream.probe_path),
        ("primary_path", &upstream.primary_path),
        ("secondary_path", &upstream.secondary_path),
    ] {
        if !path.starts_with('/') {
            errors.push(format!("upstream.{} '{}' must start with '/'", name, path));
        }
    }

    if upstream.validate_timeout_ms == 0 {
        errors.push("upstream.validate_timeout_ms must be > 0".to_string());
    }
    if upstream.fetch_timeout_ms == 0 {
        errors.push("upstream.fetch_timeout_ms must be > 0".to_string());
    }
}

fn validate_refresh(refresh: &RefreshConfig, errors: &mut Vec<String>) {
    if refresh.period_seconds == 0 {
        errors.push("refresh.period_seconds must be > 0".to_string());
    }
}
