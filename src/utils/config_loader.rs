use std::path::Path;
use anyhow::{anyhow, Result};

use crate::config::loader::file_to_config;
use crate::config::settings::ServiceConfig;

/// Load the service config; a missing file means built-in defaults.
pub fn run(config_path: &str) -> Result<ServiceConfig> {
    let path = Path::new(config_path);
    if !path.exists() {
        return Ok(ServiceConfig::default());
    }
    file_to_config(path).map_err(|e| anyhow!("Invalid config '{}': {}", config_path, e))
}
