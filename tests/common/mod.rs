//! Shared test utilities.

#![allow(dead_code, unused_imports)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use serde_json::json;
use stockroom::app::App;
use stockroom::config::PersistConfig;
use stockroom::mvi::Action;
use stockroom::persist::{
    MemoryStorage, PersistError, PersistedSnapshot, Storage, StorageError,
};

pub const ROOT_KEY: &str = "persist:root";

/// Memory storage whose reads and writes can be made to fail.
#[derive(Clone, Default)]
pub struct FlakyStorage {
    pub inner: MemoryStorage,
    pub fail_reads: Arc<AtomicBool>,
    pub fail_writes: Arc<AtomicBool>,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_reads(self) -> Self {
        self.fail_reads.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl Storage for FlakyStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                message: "read refused".into(),
            });
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                message: "write refused".into(),
            });
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

/// Build the dashboard app over `storage`, rehydrate and wait until ready.
pub async fn start(storage: &MemoryStorage) -> App {
    App::start(&PersistConfig::default(), Arc::new(storage.clone()))
        .await
        .expect("app should start")
}

/// Decoded snapshot currently in `storage`, if any.
pub fn stored_snapshot(storage: &dyn Storage) -> Option<PersistedSnapshot> {
    storage
        .get(ROOT_KEY)
        .unwrap()
        .map(|bytes| PersistedSnapshot::decode(&bytes).unwrap())
}

/// Put a version-1 snapshot with the given slices into `storage`.
pub fn seed(storage: &dyn Storage, slices: serde_json::Value) {
    let bytes = serde_json::to_vec(&json!({ "version": 1, "slices": slices })).unwrap();
    storage.set(ROOT_KEY, &bytes).unwrap();
}

pub fn drain(errors: &Receiver<PersistError>) -> Vec<PersistError> {
    errors.try_iter().collect()
}

pub fn login(id: &str, role: &str) -> Action {
    Action::new("user/login").with_payload(json!({ "id": id, "role": role }))
}
