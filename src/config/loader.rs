use std::{fs, path::Path};
use anyhow::{anyhow, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::settings::ServiceConfig;
use crate::config::validator;

/// Load and validate config from YAML file
pub fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = fs::read_to_string(path)?;
    let expanded = expand_env_vars(&content)?;
    parse_config(&expanded)
}

/// Parse YAML, apply defaults, validate. An empty document yields the defaults.
pub fn parse_config(content: &str) -> Result<ServiceConfig> {
    let service_config: ServiceConfig = if content.trim().is_empty() {
        ServiceConfig::default()
    } else {
        serde_yaml::from_str(content).inspect_err(|e| error!("parse config error: {}", e))?
    };

    debug!("validating config ...");
    validator::validate_service_config(&service_config)
        .map_err(|errors| anyhow!("config is not valid:\n  - {}", errors.join("\n  - ")))?;

    Ok(service_config)
}

/// `${VAR}` and `${VAR:default}` are replaced from the environment.
pub fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}
