//! Error types for connreg
//!
//! Two layers of errors are defined here:
//! - [`EngineError`]: what a database engine reports when opening or closing
//!   a handle fails
//! - [`Error`]: what the registry surfaces to callers, always carrying the
//!   offending identifier when one is involved
//!
//! We use `thiserror` for the `Display` and `Error` implementations.

use crate::types::ConnectionId;
use std::io;
use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for engine primitives
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Boxed driver error kept as the source of an [`EngineError::Backend`]
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by a [`DatabaseEngine`](crate::DatabaseEngine)
#[derive(Debug, Error)]
pub enum EngineError {
    /// I/O error while preparing or touching the database file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reported by the underlying database driver
    #[error("{message}")]
    Backend {
        /// Rendered driver message
        message: String,
        /// Original driver error, if one is available
        #[source]
        source: Option<BoxedError>,
    },

    /// Failure injected on purpose (test engines)
    #[error("injected failure: {0}")]
    Injected(String),
}

impl EngineError {
    /// Wrap a driver error, keeping it as the error source
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        EngineError::Backend {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// A driver-level failure described only by a message
    pub fn message(message: impl Into<String>) -> Self {
        EngineError::Backend {
            message: message.into(),
            source: None,
        }
    }
}

/// Error types for the connection registry
///
/// | Variant | Raised by | Mapping after the error |
/// |---------|-----------|-------------------------|
/// | `EngineOpenFailed` | connect | unchanged, nothing inserted |
/// | `EngineCloseFailed` | disconnect, disconnect_all | entry retained |
/// | `CapacityExceeded` | connect | unchanged, engine not called |
/// | `Disconnected` | handle access | n/a |
/// | `Config` | configuration loading | n/a |
#[derive(Debug, Error)]
pub enum Error {
    /// The engine failed to open a handle for this identifier
    #[error("failed to open connection '{id}': {source}")]
    EngineOpenFailed {
        /// Identifier that was being connected
        id: ConnectionId,
        /// Engine-reported cause
        #[source]
        source: EngineError,
    },

    /// The engine failed to close the handle registered under this identifier
    #[error("failed to close connection '{id}': {source}")]
    EngineCloseFailed {
        /// Identifier that was being disconnected
        id: ConnectionId,
        /// Engine-reported cause
        #[source]
        source: EngineError,
    },

    /// The registry is full and the identifier is not already registered
    #[error("connection limit of {limit} reached, cannot open '{id}'")]
    CapacityExceeded {
        /// Identifier that was refused
        id: ConnectionId,
        /// Configured maximum
        limit: usize,
    },

    /// The handle was used after its connection was disconnected
    #[error("connection '{0}' has been disconnected")]
    Disconnected(ConnectionId),

    /// Invalid or unreadable configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Identifier involved in the failure, if any
    pub fn id(&self) -> Option<&ConnectionId> {
        match self {
            Error::EngineOpenFailed { id, .. }
            | Error::EngineCloseFailed { id, .. }
            | Error::CapacityExceeded { id, .. }
            | Error::Disconnected(id) => Some(id),
            Error::Config(_) => None,
        }
    }

    /// Engine-reported cause, for the two engine failure variants
    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            Error::EngineOpenFailed { source, .. } | Error::EngineCloseFailed { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}
