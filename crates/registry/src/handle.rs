//! Shared reference to one registry entry

use connreg_core::{ConnectionId, Error, Result};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

struct Entry<H> {
    id: ConnectionId,
    serial: u64,
    opened_at: Instant,
    /// `None` once the engine handle has been closed
    raw: Mutex<Option<H>>,
}

/// A connection registered in a [`ConnectionRegistry`](crate::ConnectionRegistry)
///
/// Cloning is cheap: every clone refers to the same registry entry, and two
/// handles compare equal only when they refer to the same entry. Connecting
/// twice to a registered filename therefore returns handles that are `==`.
///
/// The engine handle itself stays owned by the entry. A caller holding a
/// `ConnectionHandle` across a disconnect keeps a stale reference: [`with`]
/// then fails with [`Error::Disconnected`].
///
/// [`with`]: ConnectionHandle::with
pub struct ConnectionHandle<H> {
    inner: Arc<Entry<H>>,
}

impl<H> ConnectionHandle<H> {
    pub(crate) fn new(id: ConnectionId, serial: u64, raw: H) -> Self {
        Self {
            inner: Arc::new(Entry {
                id,
                serial,
                opened_at: Instant::now(),
                raw: Mutex::new(Some(raw)),
            }),
        }
    }

    /// Filename the connection was opened for
    pub fn filename(&self) -> &str {
        self.inner.id.filename()
    }

    /// Registry identifier of the connection
    pub fn id(&self) -> &ConnectionId {
        &self.inner.id
    }

    /// Registry-wide open sequence number
    ///
    /// Reconnecting after a disconnect yields a new entry with a larger serial.
    pub fn serial(&self) -> u64 {
        self.inner.serial
    }

    /// When the engine handle was opened
    pub fn opened_at(&self) -> Instant {
        self.inner.opened_at
    }

    /// Whether the engine handle is still open
    pub fn is_open(&self) -> bool {
        self.inner.raw.lock().is_some()
    }

    /// Run `f` against the engine handle
    ///
    /// Calls on the same connection are serialized. `f` must not call back
    /// into the registry: disconnecting waits for this handle's lock while
    /// holding the registry lock.
    ///
    /// Keep `f` short. While it runs, a `disconnect` or `disconnect_all`
    /// that reaches this connection sits on the registry write lock, and
    /// every other caller stalls behind it, including `lookup` and `count`
    /// for unrelated filenames.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Disconnected`] if the connection has been closed.
    pub fn with<R>(&self, f: impl FnOnce(&mut H) -> R) -> Result<R> {
        let mut raw = self.inner.raw.lock();
        match raw.as_mut() {
            Some(handle) => Ok(f(handle)),
            None => Err(Error::Disconnected(self.inner.id.clone())),
        }
    }

    pub(crate) fn take(&self) -> Option<H> {
        self.inner.raw.lock().take()
    }

    pub(crate) fn restore(&self, raw: H) {
        *self.inner.raw.lock() = Some(raw);
    }
}

impl<H> Clone for ConnectionHandle<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H> PartialEq for ConnectionHandle<H> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<H> Eq for ConnectionHandle<H> {}

impl<H> fmt::Debug for ConnectionHandle<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("id", &self.inner.id)
            .field("serial", &self.inner.serial)
            .field("open", &self.is_open())
            .finish()
    }
}
