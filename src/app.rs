//! Composition root: wires the dashboard slices, persistence and store.

use std::sync::mpsc::Receiver;
use std::sync::Arc;

use thiserror::Error;

use crate::config::PersistConfig;
use crate::persist::{PersistError, PersistedReducer, Persistor, Storage};
use crate::slices::root_reducer;
use crate::store::{LoggingMiddleware, Store, StoreError};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// The store and its persistor, built once and passed to the view layer.
#[derive(Clone)]
pub struct App {
    pub store: Store,
    pub persistor: Persistor,
}

impl App {
    /// Build the dashboard store over `storage`. Rehydration has not started.
    pub fn build(config: &PersistConfig, storage: Arc<dyn Storage>) -> Result<Self, BootstrapError> {
        let persisted = PersistedReducer::new(root_reducer()?, config.clone(), storage)?;
        let store = Store::builder(persisted.clone())
            .middleware(LoggingMiddleware::new())
            .build();
        let persistor = Persistor::new(store.clone(), persisted);
        Ok(Self { store, persistor })
    }

    /// Build, rehydrate, and resolve once the store is ready to render.
    pub async fn start(
        config: &PersistConfig,
        storage: Arc<dyn Storage>,
    ) -> Result<Self, BootstrapError> {
        let app = Self::build(config, storage)?;
        app.persistor.run();
        app.persistor.ready().await;
        Ok(app)
    }

    /// Empty `errors` of everything reported while rehydrating.
    ///
    /// A missing, unreadable, corrupt or outdated snapshot only means the
    /// store started from defaults, so these are logged and returned but
    /// never fail startup.
    pub fn drain_startup_errors(&self, errors: &Receiver<PersistError>) -> Vec<PersistError> {
        let startup: Vec<PersistError> = errors.try_iter().collect();
        if !startup.is_empty() {
            tracing::info!(count = startup.len(), "Stored session ignored, starting from defaults");
        }
        startup
    }

    /// Wait until every queued snapshot is in storage and return the first
    /// error reported since the last drain.
    pub fn commit(&self, errors: &Receiver<PersistError>) -> Result<(), PersistError> {
        self.persistor.flush()?;
        match errors.try_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
