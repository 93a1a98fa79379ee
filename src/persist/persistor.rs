//! Rehydration lifecycle and render gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;

use crate::mvi::Action;
use crate::persist::error::PersistError;
use crate::persist::wrapper::{PersistPhase, PersistedReducer, REHYDRATE};
use crate::store::Store;

type ReadyCallback = Box<dyn FnOnce() + Send>;

/// Drives rehydration of a store built over a [`PersistedReducer`] and
/// tells the view layer when state-dependent UI may be mounted.
///
/// `store` must dispatch through `persisted`; otherwise the rehydrate
/// action never reaches the wrapper and readiness is forced without any
/// restored state.
#[derive(Clone)]
pub struct Persistor {
    store: Store,
    persisted: PersistedReducer,
    readiness: Arc<Readiness>,
}

struct Readiness {
    ready: AtomicBool,
    notify: Notify,
    callbacks: Mutex<Vec<ReadyCallback>>,
}

impl Readiness {
    fn mark_ready(&self) {
        if self.ready.swap(true, Ordering::SeqCst) {
            return;
        }
        self.notify.notify_waiters();
        let callbacks = std::mem::take(&mut *self.callbacks.lock());
        for callback in callbacks {
            callback();
        }
    }
}

impl Persistor {
    pub fn new(store: Store, persisted: PersistedReducer) -> Self {
        Self {
            store,
            persisted,
            readiness: Arc::new(Readiness {
                ready: AtomicBool::new(false),
                notify: Notify::new(),
                callbacks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Start rehydration on a background thread. Later calls are no-ops.
    pub fn run(&self) {
        if !self.persisted.begin_rehydrate() {
            tracing::debug!(phase = ?self.persisted.phase(), "Persistor already started");
            return;
        }

        let persistor = self.clone();
        let spawned = std::thread::Builder::new()
            .name("stockroom-rehydrate".to_string())
            .spawn(move || persistor.rehydrate());
        if let Err(err) = spawned {
            tracing::warn!(error = %err, "Failed to start rehydration thread, rehydrating inline");
            self.rehydrate();
        }
    }

    fn rehydrate(&self) {
        let mut action = Action::new(REHYDRATE);
        if let Some(slices) = self.persisted.read_stored() {
            action = action.with_payload(Value::Object(slices));
        }

        if let Err(err) = self.store.dispatch(action) {
            tracing::warn!(error = %err, "Rehydrate dispatch failed");
        }
        if self.persisted.finish_rehydrate(&self.store.state()) {
            tracing::warn!("Rehydrate action never reached the persisted reducer");
        }

        tracing::info!(key = %self.persisted.config().storage_key(), "Store rehydrated");
        self.readiness.mark_ready();
    }

    pub fn phase(&self) -> PersistPhase {
        self.persisted.phase()
    }

    /// True once rehydration finished and readiness was signalled.
    pub fn is_ready(&self) -> bool {
        self.readiness.ready.load(Ordering::SeqCst)
    }

    /// Resolves once the store is rehydrated. The composition root awaits
    /// this before mounting views that read persisted slices.
    pub async fn ready(&self) {
        // Register interest before checking the flag so a readiness signal
        // between the check and the await is not lost.
        let notified = self.readiness.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_ready() {
            return;
        }
        notified.await;
    }

    /// Call `callback` once ready; immediately if already ready.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut callbacks = self.readiness.callbacks.lock();
        if self.is_ready() {
            drop(callbacks);
            callback();
            return;
        }
        callbacks.push(Box::new(callback));
    }

    /// Block until every snapshot queued so far is in storage.
    pub fn flush(&self) -> Result<(), PersistError> {
        self.persisted.flush()
    }

    /// Stop writing snapshots until [`Persistor::persist`] is called.
    pub fn pause(&self) {
        self.persisted.pause();
    }

    /// Resume writing and persist the current state immediately.
    pub fn persist(&self) {
        self.persisted.resume(&self.store.state());
    }

    /// Remove the stored snapshot and wait until it is gone.
    pub fn purge(&self) -> Result<(), PersistError> {
        self.persisted.purge()?;
        self.persisted.flush()
    }

    /// Receiving end of the persistence error channel. Only the first call gets it.
    pub fn take_errors(&self) -> Option<Receiver<PersistError>> {
        self.persisted.take_errors()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}
