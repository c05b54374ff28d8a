//! Core traits for engine abstraction
//!
//! This module defines the [`DatabaseEngine`] trait that lets the registry
//! stay independent of the database driver actually opening connections.

use crate::error::EngineError;
use crate::types::ConnectionId;

/// Physical open/close primitives of an embedded database engine
///
/// Thread safety: both methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync). The registry serializes calls
/// for the same identifier, but calls for different identifiers may still
/// overlap with `lookup`s running on other threads.
///
/// Implementations must be side-effect free on failure: a failed `open`
/// leaves no partial handle behind, and a failed `close` hands the still
/// open handle back.
///
/// Implementations must never call back into the registry that owns them.
pub trait DatabaseEngine: Send + Sync {
    /// Engine-level handle for one open connection
    type Handle: Send;

    /// Open a handle for the filename named by `id`
    ///
    /// # Errors
    ///
    /// Returns the engine's error if the database cannot be opened.
    fn open(&self, id: &ConnectionId) -> Result<Self::Handle, EngineError>;

    /// Close a handle previously returned by [`DatabaseEngine::open`]
    ///
    /// # Errors
    ///
    /// On failure the handle is returned together with the cause, so the
    /// caller keeps ownership of a resource that may still be open.
    fn close(&self, handle: Self::Handle) -> Result<(), (Self::Handle, EngineError)>;

    /// Short engine name used in log output
    fn name(&self) -> &'static str {
        "engine"
    }
}

impl<E: DatabaseEngine + ?Sized> DatabaseEngine for std::sync::Arc<E> {
    type Handle = E::Handle;

    fn open(&self, id: &ConnectionId) -> Result<Self::Handle, EngineError> {
        (**self).open(id)
    }

    fn close(&self, handle: Self::Handle) -> Result<(), (Self::Handle, EngineError)> {
        (**self).close(handle)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
