//! Error types for worsen
//!
//! Provides a unified error type for all store operations.

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Snapshot Errors
    // -------------------------------------------------------------------------
    /// Snapshot bytes are not valid compressed structured data
    #[error("Snapshot decode failed: {0}")]
    Decode(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Lock Errors
    // -------------------------------------------------------------------------
    /// The lock file is missing or its record cannot be parsed
    #[error("Unreadable lock record: {0}")]
    LockRecord(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// True for failures that the cache snapshot fallback can address
    pub fn is_decode(&self) -> bool {
        matches!(self, StoreError::Decode(_))
    }
}
