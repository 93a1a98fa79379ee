use thiserror::Error;

use crate::mvi::ReduceError;

/// Errors returned by store construction and `dispatch`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `dispatch` was called from a listener or middleware while the same
    /// thread was still reducing an earlier action.
    #[error("Re-entrant dispatch of '{action}' while '{active}' is being reduced")]
    ReentrantDispatch { action: String, active: String },

    /// A slice reducer rejected the action. The state is unchanged.
    #[error(transparent)]
    Reduce(#[from] ReduceError),

    #[error("Slice '{key}' is registered twice")]
    DuplicateSlice { key: String },
}
