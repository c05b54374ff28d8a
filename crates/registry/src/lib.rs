//! Connection registry for connreg
//!
//! [`ConnectionRegistry`] maps connection identifiers to open database
//! handles and serializes every mutation behind a single reader/writer lock:
//! - `lookup`, `count`: shared access, never block each other
//! - `connect`: atomic check-open-insert, exactly one engine open per identifier
//! - `disconnect`, `disconnect_all`: exclusive close-and-remove
//!
//! The registry is an ordinary value. Hosts that want one registry per
//! process can use [`shared`] (SQLite only).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
mod handle;
mod registry;
#[cfg(feature = "sqlite")]
pub mod shared;
mod stats;

pub use config::{RegistryConfig, CONFIG_FILE_NAME};
pub use handle::ConnectionHandle;
pub use registry::ConnectionRegistry;
pub use stats::RegistryStats;
