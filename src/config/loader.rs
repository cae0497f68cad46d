//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::EdgeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the upstream service credential.
pub const ENV_SERVICE_KEY: &str = "STREAMNODE_SERVICE_KEY";
/// Environment variable overriding the upstream base URL.
pub const ENV_BASE_URL: &str = "STREAMNODE_BASE_URL";
/// Environment variable overriding the allowed origin.
pub const ENV_ALLOWED_ORIGIN: &str = "STREAMNODE_ALLOWED_ORIGIN";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from a TOML file, overlay environment variables,
/// and validate the result.
pub fn load_config(path: &Path) -> Result<EdgeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: EdgeConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build configuration from defaults plus environment variables alone.
/// Used when no config file is given on the command line.
pub fn load_from_env() -> Result<EdgeConfig, ConfigError> {
    let mut config = EdgeConfig::default();
    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment variables onto a parsed config. The service key is a
/// secret and normally arrives only this way.
fn apply_env_overrides(config: &mut EdgeConfig) {
    if let Ok(key) = std::env::var(ENV_SERVICE_KEY) {
        config.upstream.service_key = key;
    }
    if let Ok(url) = std::env::var(ENV_BASE_URL) {
        config.upstream.base_url = url;
    }
    if let Ok(origin) = std::env::var(ENV_ALLOWED_ORIGIN) {
        config.access.allowed_origin = origin;
    }
}
