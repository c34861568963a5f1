mod schema;

pub use schema::*;

use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file")]
    IoError(#[from] std::io::Error),
    #[error("failed to parse TOML config")]
    ParseError(#[from] toml::de::Error),
    #[error("failed to parse JSON config")]
    JsonError(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("expected cluster size must be at least {min}, got {0}", min = GroupSize::MIN)]
    GroupSizeTooSmall(i64),
}

/// Load and validate the probe configuration.
///
/// `.toml` files are parsed as TOML, anything else as JSON.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ProbeConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let config: ProbeConfig = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content)?,
        _ => serde_json::from_str(&content)?,
    };
    config.validate()?;
    Ok(config)
}
