//! Error types for the creature database core library.

use thiserror::Error;

/// Top-level error type for all creature database operations.
///
/// Duplicate ids and missing ids are deliberately absent: those are
/// reported through `tracing` and a `false` return, never as errors.
#[derive(Error, Debug)]
pub enum CreatureDbError {
    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The asset was written by a newer format revision.
    #[error("Unsupported asset version {found} (supported: {supported})")]
    UnsupportedVersion {
        /// Version found in the asset.
        found: u32,
        /// Highest version this build understands.
        supported: u32,
    },

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, CreatureDbError>;
