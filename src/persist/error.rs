use thiserror::Error;

use crate::persist::storage::StorageError;

/// Errors from the persistence layer.
///
/// Apart from construction errors these never reach `dispatch`; they are
/// logged and delivered on the persistor's error channel.
#[derive(Debug, Error)]
pub enum PersistError {
    /// A whitelisted slice could not be serialized. Nothing was written.
    #[error("Failed to serialize slice '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The stored snapshot is not valid JSON or not a snapshot envelope.
    #[error("Stored snapshot is corrupt: {source}")]
    Corrupt {
        #[source]
        source: serde_json::Error,
    },

    #[error("Stored snapshot has version {stored}, expected {expected}")]
    VersionMismatch { stored: u32, expected: u32 },

    /// A stored slice no longer matches its state type; the slice keeps its default.
    #[error("Failed to restore slice '{key}': {source}")]
    Restore {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Whitelisted slice '{key}' is not registered in the root reducer")]
    UnknownSlice { key: String },

    #[error("Persistence writer has stopped")]
    WriterStopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_mismatch_displays_both_versions() {
        let err = PersistError::VersionMismatch {
            stored: 1,
            expected: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains('1'));
        assert!(msg.contains('2'));
    }

    #[test]
    fn storage_error_converts() {
        let err: PersistError = StorageError::Unavailable {
            message: "quota exceeded".into(),
        }
        .into();
        assert!(matches!(err, PersistError::Storage(_)));
        assert!(err.to_string().contains("quota exceeded"));
    }
}
