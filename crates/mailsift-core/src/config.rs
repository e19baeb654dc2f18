//! Configuration management for mailsift.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Trusted mail providers accepted as deliverable without a DNS round trip.
const DEFAULT_ALLOWED_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "outlook.com",
    "hotmail.com",
    "live.com",
    "icloud.com",
    "yandex.ru",
    "yandex.com",
    "ukr.net",
    "i.ua",
    "meta.ua",
    "proton.me",
    "protonmail.com",
    "zoho.com",
];

/// Main application configuration.
///
/// This is loaded from `~/.config/mailsift/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Token extraction settings
    pub extract: ExtractConfig,
    /// Role-address rule settings
    pub roles: RolesConfig,
    /// Format and domain validation settings
    pub validation: ValidationConfig,
    /// Progress store limits and lifetime
    pub store: StoreConfig,
    /// Job runner settings
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Load configuration from the default path, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, falling back to defaults if not found.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `MAILSIFT_JOB_TTL_SECS`: Override the job time-to-live
    /// - `MAILSIFT_PROBE_MX`: Enable or disable MX probing (true/false)
    /// - `MAILSIFT_MAX_CONCURRENT_JOBS`: Override the worker pool size
    /// - `MAILSIFT_ROLE_RULES`: Path to the role rules TOML file
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("MAILSIFT_JOB_TTL_SECS") {
            if let Ok(secs) = val.parse() {
                self.store.ttl_secs = secs;
                tracing::debug!("Override store.ttl_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("MAILSIFT_PROBE_MX") {
            if let Ok(probe) = val.parse() {
                self.validation.probe_mx = probe;
                tracing::debug!("Override validation.probe_mx from env: {}", probe);
            }
        }

        if let Ok(val) = std::env::var("MAILSIFT_MAX_CONCURRENT_JOBS") {
            if let Ok(max) = val.parse() {
                self.pipeline.max_concurrent_jobs = max;
                tracing::debug!("Override pipeline.max_concurrent_jobs from env: {}", max);
            }
        }

        if let Ok(val) = std::env::var("MAILSIFT_ROLE_RULES") {
            tracing::debug!("Override roles.rules_path from env: {}", val);
            self.roles.rules_path = Some(PathBuf::from(val));
        }

        self
    }

    /// Check that limits are usable.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for the first zero limit found.
    pub fn validate(&self) -> ConfigResult<()> {
        let checks: [(&str, u64); 10] = [
            ("extract.max_tokens", self.extract.max_tokens as u64),
            ("extract.chunk_bytes", self.extract.chunk_bytes as u64),
            ("extract.max_token_len", self.extract.max_token_len as u64),
            ("store.ttl_secs", self.store.ttl_secs),
            ("store.sample_limit", self.store.sample_limit as u64),
            ("store.max_chunk_limit", self.store.max_chunk_limit as u64),
            ("store.reap_interval_secs", self.store.reap_interval_secs),
            ("pipeline.flush_every", self.pipeline.flush_every as u64),
            ("pipeline.batch_window", self.pipeline.batch_window as u64),
            (
                "pipeline.max_concurrent_jobs",
                self.pipeline.max_concurrent_jobs as u64,
            ),
        ];

        for (field, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Save configuration to an explicit path.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let config_dir = path.parent().ok_or_else(|| ConfigError::InvalidValue {
            field: "config_path".to_string(),
            reason: "no parent directory".to_string(),
        })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/mailsift/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("org", "mailsift", "mailsift").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Token extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Hard cap on tokens taken from a buffered source
    pub max_tokens: usize,
    /// Read size for streamed sources in bytes
    pub chunk_bytes: usize,
    /// Longest token run kept; longer runs are discarded
    pub max_token_len: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_tokens: 200_000,
            chunk_bytes: 256 * 1024,
            max_token_len: 1024,
        }
    }
}

/// Role-address rule settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RolesConfig {
    /// TOML file with `local_parts` and `patterns`; built-in rules when unset
    pub rules_path: Option<PathBuf>,
}

/// Format and domain validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Trusted mail providers
    pub allowed_domains: Vec<String>,
    /// Domains known to be disposable
    pub disposable_domains: Vec<String>,
    /// Probe MX records for domains outside the allowlist
    pub probe_mx: bool,
    /// Hard timeout for a single MX probe in milliseconds
    pub mx_timeout_ms: u64,
    /// How long disposable and MX answers stay cached
    pub cache_ttl_secs: u64,
}

impl ValidationConfig {
    /// MX probe timeout as a `Duration`.
    #[must_use]
    pub fn mx_timeout(&self) -> Duration {
        Duration::from_millis(self.mx_timeout_ms)
    }

    /// Cache lifetime as a `Duration`.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allowed_domains: DEFAULT_ALLOWED_DOMAINS
                .iter()
                .map(|d| (*d).to_string())
                .collect(),
            disposable_domains: Vec::new(),
            probe_mx: false,
            mx_timeout_ms: 250,
            cache_ttl_secs: 24 * 60 * 60,
        }
    }
}

/// Progress store limits and lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Lifetime of all state belonging to a job
    pub ttl_secs: u64,
    /// Maximum raw entries kept per outcome list
    pub sample_limit: usize,
    /// Detailed records kept in the recent-results window
    pub recent_limit: usize,
    /// Upper bound for a single pagination request
    pub max_chunk_limit: usize,
    /// How often expired jobs are purged
    pub reap_interval_secs: u64,
}

impl StoreConfig {
    /// Job lifetime as a `Duration`.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Reaper period as a `Duration`.
    #[must_use]
    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            sample_limit: 200_000,
            recent_limit: 50,
            max_chunk_limit: 1000,
            reap_interval_secs: 60,
        }
    }
}

/// Job runner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Flush buffered outcomes after this many items
    pub flush_every: usize,
    /// Items per processing window; the window end always flushes
    pub batch_window: usize,
    /// Jobs allowed to run at the same time
    pub max_concurrent_jobs: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            flush_every: 200,
            batch_window: 500,
            max_concurrent_jobs: 4,
        }
    }
}
