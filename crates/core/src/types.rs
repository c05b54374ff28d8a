//! Core types for connreg
//!
//! This module defines the connection identifier. An identifier is derived
//! deterministically from a filename and is the registry key for exactly one
//! logical connection slot.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Identifier of one registered connection
///
/// The identity of a connection is the filename it was opened from, verbatim.
/// No normalization is applied: `"a.db"` and `"./a.db"` are distinct slots.
/// Path resolution is the engine's concern.
///
/// Cloning is cheap (the string is shared), and `Borrow<str>` lets maps keyed
/// by `ConnectionId` be queried with a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Arc<str>);

impl ConnectionId {
    /// Derive the identifier for a filename
    pub fn from_filename(filename: &str) -> Self {
        Self(Arc::from(filename))
    }

    /// The filename this identifier was derived from
    pub fn filename(&self) -> &str {
        &self.0
    }

    /// Alias for [`ConnectionId::filename`]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ConnectionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ConnectionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConnectionId {
    fn from(filename: &str) -> Self {
        Self::from_filename(filename)
    }
}

impl From<String> for ConnectionId {
    fn from(filename: String) -> Self {
        Self(Arc::from(filename))
    }
}
