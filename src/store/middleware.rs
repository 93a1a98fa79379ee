//! Middleware around the dispatch pipeline.

use std::time::Instant;

use crate::mvi::Action;
use crate::store::app_state::AppState;

/// Hook that runs around every dispatch, in registration order.
///
/// Middleware must not dispatch into the store it is attached to; the
/// store rejects that as a re-entrant dispatch.
pub trait Middleware: Send + Sync {
    /// Inspect or rewrite an action before it reaches the reducers.
    /// Returning `None` swallows the action.
    fn before(&self, _state: &AppState, action: Action) -> Option<Action> {
        Some(action)
    }

    /// Called after the new state is stored and before listeners run.
    fn after(&self, _action: &Action, _previous: &AppState, _next: &AppState) {}
}

/// Logs every dispatched action through `tracing`.
#[derive(Debug, Default)]
pub struct LoggingMiddleware {
    started: parking_lot::Mutex<Option<Instant>>,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Middleware for LoggingMiddleware {
    fn before(&self, _state: &AppState, action: Action) -> Option<Action> {
        tracing::trace!(action = action.kind(), "dispatch");
        *self.started.lock() = Some(Instant::now());
        Some(action)
    }

    fn after(&self, action: &Action, previous: &AppState, next: &AppState) {
        let elapsed_us = self
            .started
            .lock()
            .take()
            .map(|started| started.elapsed().as_micros() as u64)
            .unwrap_or_default();
        let changed: Vec<&str> = next
            .keys()
            .filter(|key| !next.slice_ptr_eq(previous, key))
            .collect();
        tracing::debug!(
            action = action.kind(),
            changed = ?changed,
            elapsed_us,
            "reduced"
        );
    }
}
