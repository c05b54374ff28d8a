//! Database engines for connreg
//!
//! Implementations of [`connreg_core::DatabaseEngine`]:
//! - [`SqliteEngine`]: real SQLite databases through rusqlite (feature `sqlite`)
//! - [`MemoryEngine`]: no I/O, counts every open and close and can inject
//!   failures; used to test the registry's synchronization protocol

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::{MemoryEngine, MemoryHandle};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteConfig, SqliteEngine, MEMORY_FILENAME};
