//! Configuration loading for the pkgadmin client
//!
//! This crate resolves the admin service URL, credentials and timeouts from
//! defaults, a TOML file, the environment and command line flags, in that
//! order of precedence.

pub mod settings;
pub mod toml;
pub mod merge;

// Re-export main types
pub use crate::settings::{AuthConfig, ClientConfig, DEFAULT_WEB_SERVICE_URL};
pub use crate::toml::{AuthSection, ConfigToml};
pub use crate::merge::{ConfigLayering, ConfigLoader, ConfigSource};

use thiserror::Error;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse {path}: {message} at line {line}, column {column}")]
    TomlParse {
        path: String,
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    Validation { field: String, reason: String },

    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
