//! Configuration loader for the BDR assistant.
//!
//! Reads a TOML file and deserializes it into [`AppConfig`]. A missing file
//! means "all defaults". Unlike most optional settings files, a file that
//! exists but does not parse is an error: silently falling back would swap
//! in the default routing table.

use std::path::Path;

use bdr_types::config::AppConfig;
use bdr_types::error::ConfigError;

/// Default config file name, resolved relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "bdr.toml";

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file cannot be read or parsed (including invalid routing rules),
///   returns a [`ConfigError`].
pub async fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                reason: err.to_string(),
            });
        }
    };

    let config = parse_config(&content).map_err(|reason| ConfigError::Parse {
        path: path.display().to_string(),
        reason,
    })?;

    tracing::debug!(
        path = %path.display(),
        rules = config.rules.len(),
        "loaded configuration"
    );
    Ok(config)
}

/// Parse config text. Rule validation happens during deserialization, so an
/// invalid rule surfaces here as a parse failure naming the rule.
pub fn parse_config(content: &str) -> Result<AppConfig, String> {
    toml::from_str::<AppConfig>(content).map_err(|e| e.to_string())
}
