//! Persistence decorator around the root reducer.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::config::PersistConfig;
use crate::mvi::{Action, ReduceError};
use crate::persist::error::PersistError;
use crate::persist::snapshot::{merge_inbound, PersistedSnapshot};
use crate::persist::storage::Storage;
use crate::persist::writer::{spawn_writer, ErrorReporter, WriteCommand};
use crate::store::{AppState, RootReducer, StateReducer};

/// Internal action carrying the stored slices into the store.
pub const REHYDRATE: &str = "persist/REHYDRATE";

/// Lifecycle of the persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PersistPhase {
    /// Built, persistor not started. Slices hold their defaults.
    Uninitialized = 0,
    /// Reading storage. No snapshots are written yet.
    Rehydrating = 1,
    /// Stored state applied; every change is written back.
    Ready = 2,
}

impl PersistPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Uninitialized,
            1 => Self::Rehydrating,
            _ => Self::Ready,
        }
    }
}

/// Root reducer decorated with persistence.
///
/// Passes every action to the wrapped [`RootReducer`], handles
/// [`REHYDRATE`] itself, and after each change queues the whitelisted
/// projection of the new state for the background writer. It owns no
/// application state of its own.
#[derive(Clone)]
pub struct PersistedReducer {
    inner: Arc<PersistedInner>,
}

struct PersistedInner {
    root: RootReducer,
    config: PersistConfig,
    storage: Arc<dyn Storage>,
    phase: AtomicU8,
    paused: AtomicBool,
    tracked: Mutex<Tracked>,
    writer: Sender<WriteCommand>,
    errors: ErrorReporter,
    error_rx: Mutex<Option<Receiver<PersistError>>>,
}

/// States seen by the wrapper. Locked while a snapshot is handed to the
/// writer, so writes reach the channel in the order the states were reduced.
#[derive(Default)]
struct Tracked {
    /// Newest state the wrapped reducer produced, written or not.
    latest: Option<AppState>,
    /// State of the last snapshot handed to the writer.
    written: Option<AppState>,
}

impl PersistedReducer {
    /// Wrap `root`. Starts the background writer.
    ///
    /// # Errors
    /// [`PersistError::UnknownSlice`] if the whitelist names a slice the
    /// root reducer does not have.
    pub fn new(
        root: RootReducer,
        config: PersistConfig,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, PersistError> {
        if let Some(key) = config.whitelist.iter().find(|key| !root.contains(key)) {
            return Err(PersistError::UnknownSlice { key: key.clone() });
        }

        let (errors, error_rx) = ErrorReporter::channel();
        let writer = spawn_writer(storage.clone(), config.storage_key(), errors.clone());

        Ok(Self {
            inner: Arc::new(PersistedInner {
                root,
                config,
                storage,
                phase: AtomicU8::new(PersistPhase::Uninitialized as u8),
                paused: AtomicBool::new(false),
                tracked: Mutex::new(Tracked::default()),
                writer,
                errors,
                error_rx: Mutex::new(Some(error_rx)),
            }),
        })
    }

    pub fn phase(&self) -> PersistPhase {
        PersistPhase::from_u8(self.inner.phase.load(Ordering::SeqCst))
    }

    pub fn config(&self) -> &PersistConfig {
        &self.inner.config
    }

    /// Take the receiving end of the error channel. Only the first call gets it.
    pub fn take_errors(&self) -> Option<Receiver<PersistError>> {
        self.inner.error_rx.lock().take()
    }

    /// `Uninitialized → Rehydrating`. False if rehydration already started.
    pub(crate) fn begin_rehydrate(&self) -> bool {
        self.inner
            .phase
            .compare_exchange(
                PersistPhase::Uninitialized as u8,
                PersistPhase::Rehydrating as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    /// Read the stored slices.
    ///
    /// Missing, unreadable, corrupt and version-mismatched snapshots all
    /// yield `None`; everything but "missing" is reported.
    pub(crate) fn read_stored(&self) -> Option<Map<String, Value>> {
        let key = self.inner.config.storage_key();
        let bytes = match self.inner.storage.get(&key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::debug!(key = %key, "No stored snapshot");
                return None;
            }
            Err(err) => {
                self.inner.errors.report(err.into());
                return None;
            }
        };

        let snapshot = match PersistedSnapshot::decode(&bytes) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.inner.errors.report(err);
                return None;
            }
        };

        if snapshot.version != self.inner.config.version {
            self.inner.errors.report(PersistError::VersionMismatch {
                stored: snapshot.version,
                expected: self.inner.config.version,
            });
            return None;
        }

        Some(snapshot.slices)
    }

    /// `Rehydrating → Ready`, then write `state` back. No-op in any other phase.
    pub(crate) fn finish_rehydrate(&self, state: &AppState) -> bool {
        let finished = self
            .inner
            .phase
            .compare_exchange(
                PersistPhase::Rehydrating as u8,
                PersistPhase::Ready as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();
        if finished {
            self.queue(state, true);
        }
        finished
    }

    pub(crate) fn pause(&self) {
        self.inner.paused.store(true, Ordering::SeqCst);
    }

    /// Resume writing and write the newest state right away.
    ///
    /// `current` is only used when no action changed the state since the
    /// wrapper was built; otherwise the newest reduced state wins, even if
    /// another thread reduced it after `current` was read.
    pub(crate) fn resume(&self, current: &AppState) {
        self.inner.paused.store(false, Ordering::SeqCst);
        let mut tracked = self.inner.tracked.lock();
        let state = tracked.latest.clone().unwrap_or_else(|| current.clone());
        self.write(&mut tracked, &state, true);
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.inner.paused.load(Ordering::SeqCst)
    }

    /// Queue removal of the stored snapshot.
    pub(crate) fn purge(&self) -> Result<(), PersistError> {
        let mut tracked = self.inner.tracked.lock();
        self.send(WriteCommand::Remove)?;
        tracked.written = None;
        Ok(())
    }

    /// Block until every queued write has reached storage.
    pub(crate) fn flush(&self) -> Result<(), PersistError> {
        let (ack, done) = mpsc::sync_channel(1);
        self.send(WriteCommand::Flush(ack))?;
        done.recv().map_err(|_| PersistError::WriterStopped)
    }

    fn send(&self, command: WriteCommand) -> Result<(), PersistError> {
        self.inner
            .writer
            .send(command)
            .map_err(|_| PersistError::WriterStopped)
    }

    /// Record `state` as the newest state and hand its whitelisted
    /// projection to the writer.
    fn queue(&self, state: &AppState, force: bool) {
        let mut tracked = self.inner.tracked.lock();
        tracked.latest = Some(state.clone());
        self.write(&mut tracked, state, force);
    }

    /// Skipped before `Ready`, while paused, and when every whitelisted
    /// slice is still the allocation that was last written (unless `force`).
    fn write(&self, tracked: &mut Tracked, state: &AppState, force: bool) {
        if self.phase() != PersistPhase::Ready || self.is_paused() {
            return;
        }

        let config = &self.inner.config;
        if !force {
            if let Some(previous) = tracked.written.as_ref() {
                if config.whitelist.iter().all(|key| previous.slice_ptr_eq(state, key)) {
                    return;
                }
            }
        }

        let encoded = PersistedSnapshot::project(&self.inner.root, config, state)
            .and_then(|snapshot| snapshot.encode());

        match encoded {
            Ok(bytes) => match self.send(WriteCommand::Write(bytes)) {
                Ok(()) => tracked.written = Some(state.clone()),
                Err(err) => self.inner.errors.report(err),
            },
            Err(err) => self.inner.errors.report(err),
        }
    }

    fn rehydrate(&self, state: &AppState, action: &Action) -> AppState {
        if self.phase() != PersistPhase::Rehydrating {
            tracing::debug!(phase = ?self.phase(), "Ignoring rehydrate outside of rehydration");
            return state.clone();
        }

        let inbound = match action.payload() {
            Some(Value::Object(slices)) => slices.clone(),
            _ => Map::new(),
        };
        let restored: Vec<String> = inbound.keys().cloned().collect();
        let (next, errors) = merge_inbound(&self.inner.root, &self.inner.config, state, inbound);
        for error in errors {
            self.inner.errors.report(error);
        }

        tracing::debug!(slices = ?restored, "Rehydrated");
        self.finish_rehydrate(&next);
        next
    }
}

impl StateReducer for PersistedReducer {
    fn initial_state(&self) -> AppState {
        self.inner.root.initial_state()
    }

    fn reduce(&self, state: &AppState, action: &Action) -> Result<AppState, ReduceError> {
        if action.kind() == REHYDRATE {
            return Ok(self.rehydrate(state, action));
        }

        let next = self.inner.root.reduce(state, action)?;
        if !next.ptr_eq(state) {
            self.queue(&next, false);
        }
        Ok(next)
    }
}
