//! The connection registry
//!
//! ## Locking protocol
//!
//! All state lives in one `RwLock<FxHashMap<ConnectionId, ConnectionHandle>>`.
//!
//! | Operation | Lock | Engine call under lock |
//! |-----------|------|------------------------|
//! | `lookup`, `count`, `contains`, `identifiers` | read | none |
//! | `connect` (registered id) | read | none |
//! | `connect` (new id) | upgradable, upgraded for the insert | `open` |
//! | `disconnect` | write | `close` |
//! | `disconnect_all` | write | `close` per entry |
//!
//! An upgradable read excludes writers and other upgradable holders but not
//! plain readers. `connect` re-checks the map, opens and inserts while holding
//! it, so two racing connects for one filename cannot both open: the second
//! waits, then finds the first one's entry. Readers keep seeing the
//! pre-insert map until the guard is upgraded for the insert.
//!
//! Closing happens under the write lock, so no reader ever sees an entry
//! whose engine handle is already closed.

use crate::config::RegistryConfig;
use crate::handle::ConnectionHandle;
use crate::stats::{RegistryStats, StatsCounters};
use connreg_core::{ConnectionId, DatabaseEngine, Error, Result};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

type Entries<H> = FxHashMap<ConnectionId, ConnectionHandle<H>>;

/// Concurrency-safe map from filename to open database connection
///
/// # Thread Safety
///
/// `ConnectionRegistry` is `Sync` whenever its engine and engine handles are
/// `Send`; share it by reference or `Arc` across threads. Every operation is
/// linearizable: concurrent calls behave as if executed one at a time in
/// some order consistent with what every caller observed.
///
/// # Example
///
/// ```ignore
/// use connreg_engine::SqliteEngine;
/// use connreg_registry::ConnectionRegistry;
///
/// let registry = ConnectionRegistry::new(SqliteEngine::in_dir("/tmp/dbs"));
/// let conn = registry.connect("app.db")?;
/// assert_eq!(registry.lookup("app.db"), Some(conn));
/// registry.disconnect("app.db")?;
/// assert_eq!(registry.count(), 0);
/// ```
pub struct ConnectionRegistry<E: DatabaseEngine> {
    engine: E,
    config: RegistryConfig,
    entries: RwLock<Entries<E::Handle>>,
    next_serial: AtomicU64,
    stats: StatsCounters,
}

impl<E: DatabaseEngine> ConnectionRegistry<E> {
    /// Create an empty, unbounded registry
    pub fn new(engine: E) -> Self {
        Self::build(engine, RegistryConfig::default())
    }

    /// Create an empty registry with the given configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn with_config(engine: E, config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(engine, config))
    }

    fn build(engine: E, config: RegistryConfig) -> Self {
        Self {
            engine,
            config,
            entries: RwLock::new(FxHashMap::default()),
            next_serial: AtomicU64::new(1),
            stats: StatsCounters::default(),
        }
    }

    /// The engine connections are opened with
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Connect to `filename`, or return its already-registered connection
    ///
    /// At most one engine open happens per registered filename, however many
    /// threads race to connect it.
    ///
    /// # Errors
    ///
    /// - [`Error::EngineOpenFailed`] if the engine cannot open the database;
    ///   nothing is registered
    /// - [`Error::CapacityExceeded`] if the registry is full and `filename`
    ///   is not registered yet; the engine is not called
    pub fn connect(&self, filename: &str) -> Result<ConnectionHandle<E::Handle>> {
        if let Some(existing) = self.entries.read().get(filename) {
            return Ok(self.reuse(existing));
        }

        let entries = self.entries.upgradable_read();
        // Another connect may have won while we waited for the upgradable lock
        if let Some(existing) = entries.get(filename) {
            return Ok(self.reuse(existing));
        }

        let id = ConnectionId::from_filename(filename);
        if let Some(limit) = self.config.max_connections {
            if entries.len() >= limit {
                debug!(target: "connreg::registry", id = %id, limit, "Connection limit reached");
                return Err(Error::CapacityExceeded { id, limit });
            }
        }

        let raw = match self.engine.open(&id) {
            Ok(raw) => raw,
            Err(source) => {
                StatsCounters::bump(&self.stats.open_failures);
                debug!(
                    target: "connreg::registry",
                    id = %id,
                    engine = self.engine.name(),
                    error = %source,
                    "Engine open failed"
                );
                return Err(Error::EngineOpenFailed { id, source });
            }
        };

        let serial = self.next_serial.fetch_add(1, Ordering::Relaxed);
        let handle = ConnectionHandle::new(id.clone(), serial, raw);

        let mut entries = RwLockUpgradableReadGuard::upgrade(entries);
        entries.insert(id, handle.clone());
        StatsCounters::bump(&self.stats.opens);
        debug!(
            target: "connreg::registry",
            id = %handle.id(),
            serial,
            connected = entries.len(),
            "Connection registered"
        );

        Ok(handle)
    }

    fn reuse(&self, existing: &ConnectionHandle<E::Handle>) -> ConnectionHandle<E::Handle> {
        StatsCounters::bump(&self.stats.reused);
        existing.clone()
    }

    /// Close and unregister the connection for `filename`
    ///
    /// Disconnecting a filename that is not registered is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EngineCloseFailed`] if the engine fails to close the
    /// handle. The entry then stays registered with its handle still open.
    pub fn disconnect(&self, filename: &str) -> Result<()> {
        let mut entries = self.entries.write();
        let Some(entry) = entries.get(filename) else {
            debug!(target: "connreg::registry", id = filename, "Disconnect of unregistered connection");
            return Ok(());
        };

        self.close_entry(entry)?;
        entries.remove(filename);
        debug!(
            target: "connreg::registry",
            id = filename,
            connected = entries.len(),
            "Connection unregistered"
        );
        Ok(())
    }

    /// Close and unregister every connection
    ///
    /// Runs under one exclusive lock: every mutation started before it
    /// completes first, every mutation started after it sees its result.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::EngineCloseFailed`]. Every other entry is
    /// still closed; the entries whose close failed stay registered.
    pub fn disconnect_all(&self) -> Result<()> {
        let mut entries = self.entries.write();
        let total = entries.len();
        let mut first_error = None;
        let mut failed = 0usize;

        entries.retain(|_, entry| match self.close_entry(entry) {
            Ok(()) => false,
            Err(e) => {
                failed += 1;
                if first_error.is_none() {
                    first_error = Some(e);
                }
                true
            }
        });

        info!(
            target: "connreg::registry",
            closed = total - failed,
            failed,
            "Disconnected all connections"
        );

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Close the engine handle of `entry`, restoring it if the engine refuses
    fn close_entry(&self, entry: &ConnectionHandle<E::Handle>) -> Result<()> {
        let Some(raw) = entry.take() else {
            return Ok(());
        };

        match self.engine.close(raw) {
            Ok(()) => {
                StatsCounters::bump(&self.stats.closes);
                Ok(())
            }
            Err((raw, source)) => {
                entry.restore(raw);
                StatsCounters::bump(&self.stats.close_failures);
                warn!(
                    target: "connreg::registry",
                    id = %entry.id(),
                    engine = self.engine.name(),
                    error = %source,
                    "Engine close failed, connection kept registered"
                );
                Err(Error::EngineCloseFailed {
                    id: entry.id().clone(),
                    source,
                })
            }
        }
    }

    /// The registered connection for `filename`, if any
    pub fn lookup(&self, filename: &str) -> Option<ConnectionHandle<E::Handle>> {
        self.entries.read().get(filename).cloned()
    }

    /// Whether `filename` is registered
    pub fn contains(&self, filename: &str) -> bool {
        self.entries.read().contains_key(filename)
    }

    /// Number of registered connections
    pub fn count(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether no connection is registered
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Sorted snapshot of the registered identifiers
    pub fn identifiers(&self) -> Vec<ConnectionId> {
        let mut ids: Vec<_> = self.entries.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Current counters
    pub fn stats(&self) -> RegistryStats {
        let connected = self.entries.read().len();
        self.stats.snapshot(connected)
    }
}

impl<E: DatabaseEngine> fmt::Debug for ConnectionRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("engine", &self.engine.name())
            .field("max_connections", &self.config.max_connections)
            .field("connected", &self.count())
            .finish()
    }
}

impl<E: DatabaseEngine> Drop for ConnectionRegistry<E> {
    fn drop(&mut self) {
        let entries = std::mem::take(self.entries.get_mut());
        if entries.is_empty() {
            return;
        }
        let total = entries.len();
        // Failures are logged by close_entry; the handles are dropped anyway
        let failed = entries
            .values()
            .filter(|entry| self.close_entry(entry).is_err())
            .count();
        debug!(
            target: "connreg::registry",
            closed = total - failed,
            failed,
            "Registry dropped"
        );
    }
}
