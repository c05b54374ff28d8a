//! SQLite engine backed by rusqlite
//!
//! Each identifier is treated as a database filename. Relative filenames are
//! resolved against the configured base directory; absolute filenames are
//! used as-is; [`MEMORY_FILENAME`] opens a private in-memory database.

use connreg_core::{ConnectionId, DatabaseEngine, EngineError};
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Filename that opens an in-memory database instead of a file
pub const MEMORY_FILENAME: &str = ":memory:";

/// Settings for [`SqliteEngine`], the `[sqlite]` section of `connreg.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Directory relative filenames are resolved against (default: the
    /// process working directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
    /// How long SQLite waits on a locked database, in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Open databases read-only
    #[serde(default)]
    pub read_only: bool,
    /// Create missing database files (ignored when `read_only`)
    #[serde(default = "default_create")]
    pub create: bool,
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_create() -> bool {
    true
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            read_only: false,
            create: default_create(),
        }
    }
}

impl SqliteConfig {
    /// Config resolving relative filenames against `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Set read-only mode
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Set busy timeout
    pub fn busy_timeout(mut self, ms: u64) -> Self {
        self.busy_timeout_ms = ms;
        self
    }

    fn open_flags(&self) -> OpenFlags {
        let mode = if self.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else if self.create {
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };
        // Connections are guarded by the registry entry's mutex
        mode | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX
    }
}

/// [`DatabaseEngine`] opening SQLite databases
#[derive(Debug, Clone, Default)]
pub struct SqliteEngine {
    config: SqliteConfig,
}

impl SqliteEngine {
    /// Create an engine with the given settings
    pub fn new(config: SqliteConfig) -> Self {
        Self { config }
    }

    /// Engine resolving relative filenames against `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(SqliteConfig::in_dir(dir))
    }

    /// Engine settings
    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Path a filename resolves to, or `None` for the in-memory filename
    pub fn resolve(&self, filename: &str) -> Option<PathBuf> {
        if filename == MEMORY_FILENAME {
            return None;
        }
        let path = Path::new(filename);
        match &self.config.base_dir {
            Some(base) if path.is_relative() => Some(base.join(path)),
            _ => Some(path.to_path_buf()),
        }
    }
}

impl DatabaseEngine for SqliteEngine {
    type Handle = Connection;

    fn open(&self, id: &ConnectionId) -> Result<Connection, EngineError> {
        let flags = self.config.open_flags();
        let conn = match self.resolve(id.filename()) {
            None => Connection::open_in_memory_with_flags(flags).map_err(EngineError::backend)?,
            Some(path) => {
                if self.config.create && !self.config.read_only {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                Connection::open_with_flags(&path, flags).map_err(EngineError::backend)?
            }
        };
        conn.busy_timeout(Duration::from_millis(self.config.busy_timeout_ms))
            .map_err(EngineError::backend)?;

        debug!(target: "connreg::engine", id = %id, "Opened SQLite connection");
        Ok(conn)
    }

    fn close(&self, handle: Connection) -> Result<(), (Connection, EngineError)> {
        handle
            .close()
            .map_err(|(conn, e)| (conn, EngineError::backend(e)))
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
