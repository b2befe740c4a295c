//! Error types for the store crate.

use thiserror::Error;

/// Errors that can occur in a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Lock,

    /// Journal could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Journal record could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
