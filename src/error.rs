//! # Error Types
//!
//! Unified error type for the catalog engine, following the error kinds laid
//! out for this system: argument errors (bad caller input), operation errors
//! (failed preconditions), dependency vetoes (a referential-integrity
//! subscriber refused a deletion), integrity errors (an invariant broke), and
//! I/O errors from persistence.

use thiserror::Error;

/// Top-level error type returned by every service in this crate.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The caller passed a bad value: wrong type, missing field, malformed
    /// date, unknown filter operator, and so on.
    #[error("argument error: {0}")]
    Argument(String),

    /// A runtime precondition failed: entity not found, cutoff after the
    /// target date, invalid cache file, unsupported reference kind.
    #[error("operation error: {0}")]
    Operation(String),

    /// A `check_dependencies` subscriber refused a deletion because some
    /// entity still references the target.
    #[error("{holder} refuses deletion: {message}")]
    Veto {
        /// Identity (code) of the entity that holds the reference.
        holder: String,
        /// Human-readable explanation.
        message: String,
    },

    /// An invariant from the data model was violated (e.g. a reference
    /// field points at a code absent from the repository).
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Wrapped I/O failure from cache or settings persistence.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl CatalogError {
    /// Build an argument error from anything that displays.
    pub fn argument(msg: impl Into<String>) -> Self {
        Self::Argument(msg.into())
    }

    /// Build an operation error from anything that displays.
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// Build a veto error carrying the holder's identity.
    pub fn veto(holder: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Veto {
            holder: holder.into(),
            message: msg.into(),
        }
    }

    /// Build an integrity error from anything that displays.
    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CatalogError>;
