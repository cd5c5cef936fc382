//! Error types for config loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading or merging config documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML stream could not be parsed.
    #[error("invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A config document declares an apiVersion this version does not understand.
    #[error("unsupported config apiVersion: expected '{expected}', got '{actual}'")]
    UnsupportedVersion {
        expected: &'static str,
        actual: String,
    },

    /// A change group has an empty name.
    #[error("additional change group #{index} has an empty name")]
    EmptyGroupName { index: usize },

    /// A change rule lists no rule strings.
    #[error("additional change rule #{index} has no rules")]
    EmptyRules { index: usize },

    /// A config file was read but its contents are invalid.
    #[error("invalid config file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: Box<ConfigError>,
    },

    /// A config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
