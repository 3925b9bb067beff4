#![forbid(unsafe_code)]

//! Support code for the `canopy` binary: seed-file import and tree walking.

use thiserror::Error;

use crate::config::ConfigError;
use crate::types::CanopyError;

/// Depth-first listing of a cached hierarchy.
pub mod render;

/// JSON seed files describing an initial hierarchy.
pub mod seed;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Generic error message.
    #[error("{0}")]
    Message(String),
    /// IO error from file operations.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Malformed seed file.
    #[error("invalid seed file: {0}")]
    Seed(#[from] serde_json::Error),
    /// Store or cache error.
    #[error(transparent)]
    Store(#[from] CanopyError),
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<&str> for CliError {
    fn from(value: &str) -> Self {
        CliError::Message(value.to_string())
    }
}

impl From<String> for CliError {
    fn from(value: String) -> Self {
        CliError::Message(value)
    }
}
