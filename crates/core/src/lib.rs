//! Core types and traits for connreg
//!
//! This crate defines the foundational types used throughout the system:
//! - ConnectionId: Key naming one connection slot (derived from a filename)
//! - EngineError: Failures reported by a database engine
//! - Error: Registry-level error taxonomy
//! - DatabaseEngine: The open/close seam implemented by engine crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{EngineError, EngineResult, Error, Result};
pub use traits::DatabaseEngine;
pub use types::ConnectionId;
