//! The `session` slice: dashboard filters and pagination.
//!
//! Never on the persistence allow-list; a reload always starts from the
//! default listing.

mod intent;
mod reducer;
mod state;

pub use intent::{FilterPayload, PagePayload, SessionIntent, RESET, SET_FILTER, SET_PAGE};
pub use reducer::SessionReducer;
pub use state::{SessionState, TransactionKind, DEFAULT_PAGE_SIZE};
