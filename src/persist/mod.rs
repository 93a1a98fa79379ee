//! Persisted state: the reducer decorator, the stored snapshot format,
//! the background writer and the rehydration lifecycle.
//!
//! ```text
//! dispatch ──→ PersistedReducer ──→ RootReducer ──→ new AppState
//!                    │
//!                    └─ whitelisted projection ──→ writer thread ──→ Storage
//!
//! Persistor::run ──→ Storage::get ──→ persist/REHYDRATE ──→ ready()
//! ```

mod error;
mod persistor;
mod snapshot;
pub mod storage;
mod wrapper;
mod writer;

pub use error::PersistError;
pub use persistor::Persistor;
pub use snapshot::PersistedSnapshot;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use wrapper::{PersistPhase, PersistedReducer, REHYDRATE};
