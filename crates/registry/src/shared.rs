//! Process-wide SQLite registry
//!
//! Most code should own a [`ConnectionRegistry`] and pass it around. Hosts
//! built around a single registry per process can instead call [`init`] once
//! at startup and [`get`] everywhere else.

use crate::config::RegistryConfig;
use crate::registry::ConnectionRegistry;
use connreg_core::Result;
use connreg_engine::SqliteEngine;
use once_cell::sync::OnceCell;
use tracing::{debug, info};

static SHARED: OnceCell<ConnectionRegistry<SqliteEngine>> = OnceCell::new();

/// Initialize the shared registry from `config`
///
/// The first successful call wins. Later calls return the existing registry
/// and ignore their `config`.
///
/// # Errors
///
/// Returns [`connreg_core::Error::Config`] if this call performs the
/// initialization and the configuration is invalid.
pub fn init(config: RegistryConfig) -> Result<&'static ConnectionRegistry<SqliteEngine>> {
    let mut created = false;
    let registry = SHARED.get_or_try_init(|| {
        created = true;
        let engine = SqliteEngine::new(config.sqlite.clone());
        ConnectionRegistry::with_config(engine, config)
    })?;

    if created {
        info!(
            target: "connreg::registry",
            max_connections = ?registry.config().max_connections,
            "Shared registry initialized"
        );
    } else {
        debug!(target: "connreg::registry", "Shared registry already initialized");
    }
    Ok(registry)
}

/// The shared registry, initialized with default settings if [`init`] has
/// not run yet
pub fn get() -> &'static ConnectionRegistry<SqliteEngine> {
    SHARED.get_or_init(|| ConnectionRegistry::new(SqliteEngine::default()))
}

/// The shared registry, if it has been initialized
pub fn try_get() -> Option<&'static ConnectionRegistry<SqliteEngine>> {
    SHARED.get()
}
