//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Errors in the `[components]` declarations.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("unknown component `{key}` referenced by `{referenced_by}`")]
    UnknownComponent { key: String, referenced_by: String },

    #[error("component cycle: {cycle}")]
    ImportCycle { cycle: String },

    #[error("root component `{0}` is not declared in [components]")]
    MissingRoot(String),
}
