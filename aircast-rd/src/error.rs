//! Error types for aircast-rd
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation. Per-track errors (`Retrieval`, `Flow`) and `Catalog`
//! errors are caught at their own boundary and never unwind past one
//! playback loop iteration; only `Pipeline` construction errors are fatal.

use thiserror::Error;

/// Main error type for aircast-rd
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog listing failed (callers treat this as an empty catalog)
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Object fetch failed before or during a stream (aborts current track)
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Pipeline rejected a chunk (aborts current track)
    #[error("Flow error: {0}")]
    Flow(String),

    /// Transport pipeline failed to construct or start (fatal)
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Object storage backend errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using aircast-rd Error
pub type Result<T> = std::result::Result<T, Error>;
