//! Reducer trait for slices.

use std::sync::Arc;

use super::action::{Action, ReduceError};
use super::state::SliceState;

/// Reducer transforms one slice of state based on dispatched actions.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: `(State, Action) -> State`.
pub trait Reducer: 'static {
    /// Key of the slice inside the application state. Unique per store.
    const KEY: &'static str;

    /// The state type this reducer operates on.
    type State: SliceState;

    /// Process an action and return the new state.
    ///
    /// Actions the reducer does not handle must return `state` itself
    /// (the same `Arc`), so consumers can detect changes by pointer.
    fn reduce(state: Arc<Self::State>, action: &Action) -> Result<Arc<Self::State>, ReduceError>;
}
