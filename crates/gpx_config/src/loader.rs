//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::RunConfig;
use std::path::Path;

/// Loads and validates a `parcfg.toml` run configuration from a project
/// directory.
pub fn load_config(project_dir: &Path) -> Result<RunConfig, ConfigError> {
    let config_path = project_dir.join("parcfg.toml");
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a run configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<RunConfig, ConfigError> {
    let config: RunConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &RunConfig) -> Result<(), ConfigError> {
    if config.device.part.is_empty() {
        return Err(ConfigError::MissingField("device.part".to_string()));
    }
    if config.anneal.seed.is_none() {
        return Err(ConfigError::MissingField("anneal.seed".to_string()));
    }
    if !(0.0..1.0).contains(&config.anneal.cooling_rate) {
        return Err(ConfigError::ValidationError(
            "anneal.cooling_rate must be in (0, 1)".to_string(),
        ));
    }
    Ok(())
}
