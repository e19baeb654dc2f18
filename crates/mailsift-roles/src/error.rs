//! Error types for role rule loading.

use thiserror::Error;

/// Errors that can occur while loading role rules.
#[derive(Error, Debug)]
pub enum RoleError {
    /// Failed to read the rules file
    #[error("failed to read role rules from {path}: {source}")]
    Read {
        /// Path to the rules file
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the rules TOML
    #[error("failed to parse role rules TOML in {origin}: {source}")]
    Parse {
        /// Where the rules came from
        origin: String,
        /// TOML parse error
        #[source]
        source: toml::de::Error,
    },

    /// A configured pattern is not a valid regular expression
    #[error("invalid role pattern '{pattern}': {source}")]
    Pattern {
        /// Offending pattern source
        pattern: String,
        /// Regex compile error
        #[source]
        source: regex::Error,
    },
}

/// Result type for role rule operations.
pub type Result<T> = std::result::Result<T, RoleError>;
