//! Durable key-value storage behind the persistence layer.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a [`Storage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read '{key}' from {path}: {source}")]
    Read {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{key}' to {path}: {source}")]
    Write {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },
}

/// Byte-oriented key-value store.
///
/// Implementations are called from background threads and must be
/// shareable across them.
pub trait Storage: Send + Sync {
    /// Stored bytes for `key`, or `None` if nothing was stored.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
