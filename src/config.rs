//! TOML configuration for the store and for logging.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::storage::StoreOptions;

/// Default `tracing` filter directive.
pub const DEFAULT_LOG_FILTER: &str = "canopy=info";

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanopyConfig {
    /// Store options.
    pub store: StoreOptions,
    /// Logging options.
    pub log: LogOptions,
}

/// Logging section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogOptions {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl CanopyConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::parse(contents, "<inline>")
    }

    /// Reads and parses the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, &path.display().to_string())
    }

    /// Loads `explicit` if given, otherwise [`default_config_path`] when that
    /// file exists, otherwise the defaults. A missing explicit file is an error.
    pub fn load_or_default(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(&path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Builds the log filter this configuration asks for.
    pub fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        EnvFilter::try_new(&self.log.filter).map_err(|err| ConfigError::InvalidFilter {
            filter: self.log.filter.clone(),
            reason: err.to_string(),
        })
    }

    fn parse(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: CanopyConfig =
            toml::from_str(contents).map_err(|source| ConfigError::Parse {
                origin: origin.to_string(),
                source,
            })?;
        config.env_filter()?;
        Ok(config)
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The file is not valid configuration TOML.
    #[error("failed to parse config {origin}: {source}")]
    Parse {
        /// File path, or `<inline>`.
        origin: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
    /// `log.filter` is not a valid filter directive.
    #[error("invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// Rejected directive.
        filter: String,
        /// Parser message.
        reason: String,
    },
}

/// Per-user configuration file location.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("canopy").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ChildOrder;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let config = CanopyConfig::from_toml_str("").unwrap();
        assert_eq!(config, CanopyConfig::default());
        assert_eq!(config.log.filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn sections_override_defaults() {
        let config = CanopyConfig::from_toml_str(
            r#"
            [store]
            child_order = "insertion"

            [log]
            filter = "canopy=debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.child_order, ChildOrder::Insertion);
        assert_eq!(config.log.filter, "canopy=debug");
    }

    #[test]
    fn unknown_keys_and_bad_values_are_rejected() {
        assert!(matches!(
            CanopyConfig::from_toml_str("[store]\nchild_order = \"random\"\n"),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            CanopyConfig::from_toml_str("[cache]\nsize = 3\n"),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            CanopyConfig::from_toml_str("[log]\nfilter = \"canopy=loudest\"\n"),
            Err(ConfigError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn loads_from_file_and_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("canopy.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[store]\nchild_order = \"name\"").unwrap();
        drop(file);

        let config = CanopyConfig::load_or_default(Some(path.clone())).unwrap();
        assert_eq!(config.store.child_order, ChildOrder::Name);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            CanopyConfig::load_or_default(Some(missing)),
            Err(ConfigError::Read { .. })
        ));
    }
}
