//! Registry configuration via `connreg.toml`
//!
//! A host either builds a [`RegistryConfig`] in code or loads it from a TOML
//! file. `write_default_if_missing` drops a commented default file on first
//! run; edit it and restart to change settings.

use connreg_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(feature = "sqlite")]
use connreg_engine::SqliteConfig;

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "connreg.toml";

/// Registry configuration loaded from `connreg.toml`.
///
/// # Example
///
/// ```toml
/// max_connections = 64
///
/// [sqlite]
/// base_dir = "/var/lib/app/db"
/// busy_timeout_ms = 5000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Maximum simultaneously registered connections. `None` is unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<usize>,
    /// Settings for the SQLite engine.
    #[cfg(feature = "sqlite")]
    #[serde(default)]
    pub sqlite: SqliteConfig,
}

impl RegistryConfig {
    /// Set the connection limit.
    pub fn with_max_connections(mut self, limit: usize) -> Self {
        self.max_connections = Some(limit);
        self
    }

    /// Set the SQLite engine settings.
    #[cfg(feature = "sqlite")]
    pub fn with_sqlite(mut self, sqlite: SqliteConfig) -> Self {
        self.sqlite = sqlite;
        self
    }

    /// Check the configuration for values the registry cannot honour.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `max_connections` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == Some(0) {
            return Err(Error::Config(
                "max_connections must be at least 1 (omit it for no limit)".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# connreg configuration
#
# Maximum number of simultaneously registered connections.
# Connecting a new filename beyond the limit fails; reconnecting an
# already-registered filename always succeeds. Omit for no limit.
# max_connections = 64

[sqlite]
# Directory relative filenames are resolved against (default: working dir)
# base_dir = "/var/lib/app/db"

# How long SQLite waits on a locked database, in milliseconds
busy_timeout_ms = 5000

# Open every database read-only
read_only = false

# Create missing database files
create = true
"#
    }

    /// Parse and validate a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the text cannot be parsed or is invalid.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RegistryConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
