//! Error types for configuration loading.

use thiserror::Error;

/// Errors that can occur when loading the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("Failed to read config '{path}': {details}")]
    ReadError { path: String, details: String },

    /// RON parsing failed.
    #[error("Parse error in config '{path}': {details}")]
    ParseError { path: String, details: String },

    /// The file parsed but a value makes no sense.
    #[error("Invalid value for '{field}' in config '{path}': {details}")]
    InvalidValue {
        path: String,
        field: &'static str,
        details: String,
    },
}
