//! The state container.
//!
//! A [`Store`] owns the current [`AppState`], runs every dispatched action
//! through the middleware chain and the reducer, and notifies subscribers
//! once the new state is in place. It is built explicitly by the
//! composition root and shared by cloning.

mod app_state;
mod error;
mod middleware;
mod root;

pub use app_state::AppState;
pub use error::StoreError;
pub use middleware::{LoggingMiddleware, Middleware};
pub use root::{RootReducer, RootReducerBuilder, StateReducer};

pub(crate) use app_state::SliceValue;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use parking_lot::{Mutex, RwLock};

use crate::mvi::{Action, Reducer};

type Listener = Arc<dyn Fn(&AppState) + Send + Sync>;

/// Shared handle to the state container.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    reducer: Arc<dyn StateReducer>,
    middleware: Vec<Box<dyn Middleware>>,
    state: RwLock<AppState>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
    /// Serializes dispatches coming from different threads.
    dispatch_lock: Mutex<()>,
    /// Thread and action currently being dispatched.
    active: Mutex<Option<(ThreadId, String)>>,
}

impl Store {
    pub fn new(reducer: impl StateReducer + 'static) -> Self {
        Self::builder(reducer).build()
    }

    pub fn builder(reducer: impl StateReducer + 'static) -> StoreBuilder {
        StoreBuilder {
            reducer: Arc::new(reducer),
            middleware: Vec::new(),
        }
    }

    /// Current snapshot. Cheap to clone and never changes after return.
    pub fn state(&self) -> AppState {
        self.inner.state.read().clone()
    }

    /// Typed access to one slice of the current state.
    pub fn select<R: Reducer>(&self) -> Arc<R::State> {
        self.state().slice::<R>()
    }

    /// Run `action` through middleware and reducers.
    ///
    /// Reducers run synchronously on the calling thread. Listeners are
    /// called after the state has been swapped, on the same thread.
    ///
    /// Re-entry is detected per thread. A listener or middleware that hands
    /// a dispatch to another thread must not wait for it: that thread
    /// blocks until the outer dispatch returns, so joining it deadlocks.
    ///
    /// # Errors
    /// - [`StoreError::ReentrantDispatch`] when called from a listener or
    ///   middleware of a dispatch that is still in progress on this thread
    /// - [`StoreError::Reduce`] when a reducer rejects the action; the
    ///   state is left untouched and listeners are not called
    pub fn dispatch(&self, action: impl Into<Action>) -> Result<(), StoreError> {
        let action = action.into();
        let current_thread = thread::current().id();

        if let Some((owner, active)) = self.inner.active.lock().as_ref() {
            if *owner == current_thread {
                return Err(StoreError::ReentrantDispatch {
                    action: action.kind().to_string(),
                    active: active.clone(),
                });
            }
        }

        let _serial = self.inner.dispatch_lock.lock();
        *self.inner.active.lock() = Some((current_thread, action.kind().to_string()));
        scopeguard::defer! {
            *self.inner.active.lock() = None;
        }

        let previous = self.state();
        let Some(action) = self
            .inner
            .middleware
            .iter()
            .try_fold(action, |action, middleware| middleware.before(&previous, action))
        else {
            tracing::debug!("Action swallowed by middleware");
            return Ok(());
        };

        let next = self.inner.reducer.reduce(&previous, &action)?;
        *self.inner.state.write() = next.clone();

        for middleware in &self.inner.middleware {
            middleware.after(&action, &previous, &next);
        }

        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&next);
        }

        Ok(())
    }

    /// Register a listener called after every dispatch with the new state.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AppState) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }
}

pub struct StoreBuilder {
    reducer: Arc<dyn StateReducer>,
    middleware: Vec<Box<dyn Middleware>>,
}

impl StoreBuilder {
    /// Append a middleware. Middleware runs in the order it was added.
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    pub fn build(self) -> Store {
        let state = self.reducer.initial_state();
        Store {
            inner: Arc::new(StoreInner {
                reducer: self.reducer,
                middleware: self.middleware,
                state: RwLock::new(state),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
                dispatch_lock: Mutex::new(()),
                active: Mutex::new(None),
            }),
        }
    }
}

/// Handle returned by [`Store::subscribe`].
pub struct Subscription {
    id: u64,
    store: Weak<StoreInner>,
}

impl Subscription {
    /// Detach the listener. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(inner) = self.store.upgrade() else {
            return false;
        };
        let mut listeners = inner.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != self.id);
        listeners.len() != before
    }
}
