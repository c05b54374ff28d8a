//! connreg - concurrency-safe registry of embedded database connections
//!
//! A [`ConnectionRegistry`] maps filenames to open database connections and
//! lets any number of threads connect, look up and disconnect them without
//! races: one engine open per filename, consistent counts, and no reader
//! ever seeing a half-closed connection.
//!
//! # Quick Start
//!
//! ```ignore
//! use connreg::{ConnectionRegistry, SqliteEngine};
//!
//! let registry = ConnectionRegistry::new(SqliteEngine::in_dir("/var/lib/app"));
//!
//! // Opens the database (or returns the already-open connection)
//! let conn = registry.connect("users.db")?;
//! conn.with(|db| db.execute_batch("CREATE TABLE IF NOT EXISTS users (name TEXT)"))??;
//!
//! assert_eq!(registry.count(), 1);
//! registry.disconnect_all()?;
//! ```
//!
//! # Architecture
//!
//! - `connreg-core`: identifiers, errors and the [`DatabaseEngine`] trait
//! - `connreg-engine`: [`SqliteEngine`] and the instrumented [`MemoryEngine`]
//! - `connreg-registry`: the registry, its configuration and the shared instance

pub use connreg_core::{ConnectionId, DatabaseEngine, EngineError, EngineResult, Error, Result};
pub use connreg_engine::{MemoryEngine, MemoryHandle};
#[cfg(feature = "sqlite")]
pub use connreg_engine::{SqliteConfig, SqliteEngine, MEMORY_FILENAME};
#[cfg(feature = "sqlite")]
pub use connreg_registry::shared;
pub use connreg_registry::{
    ConnectionHandle, ConnectionRegistry, RegistryConfig, RegistryStats, CONFIG_FILE_NAME,
};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global `tracing` subscriber writing to stderr
///
/// `RUST_LOG` takes precedence over `default_level` (for example `"info"` or
/// `"connreg::registry=debug"`). Does nothing if a subscriber is already
/// installed, so it is safe to call from every test.
pub fn init_tracing(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init();
}
