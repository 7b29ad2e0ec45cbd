//! Error types for folio_app

use folio_core::SelectorError;
use thiserror::Error;

/// Errors that can occur while reading page configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML document could not be parsed
    #[error("config parse failed: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// A selector string does not parse
    #[error("invalid selector for `{field}`: {source}")]
    Selector {
        field: &'static str,
        #[source]
        source: SelectorError,
    },
}

/// Result type for folio_app operations
pub type Result<T> = std::result::Result<T, ConfigError>;
