pub mod check;
pub mod roles;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use mailsift_core::AppConfig;
use tracing::{debug, warn};

/// Load configuration from `path` or the default location, then apply
/// environment overrides and reject invalid limits.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => AppConfig::load().unwrap_or_else(|e| {
            warn!(error = %e, "no usable default config, using built-in defaults");
            AppConfig::default()
        }),
    }
    .with_env_overrides();

    config.validate().context("Invalid configuration")?;
    debug!(?config, "configuration loaded");
    Ok(config)
}
