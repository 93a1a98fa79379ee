//! The application state: one immutable value per registered slice.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::mvi::Reducer;

/// Type-erased slice value. Always holds an `Arc<R::State>` for the slice's reducer.
pub(crate) type SliceValue = Arc<dyn Any + Send + Sync>;

/// Immutable snapshot of every slice, keyed by slice name.
///
/// Cloning is cheap. Two snapshots that are [`AppState::ptr_eq`] are
/// guaranteed to be identical; unchanged slices keep their `Arc` across
/// dispatches.
#[derive(Clone)]
pub struct AppState {
    slices: Arc<BTreeMap<&'static str, SliceValue>>,
}

impl AppState {
    pub(crate) fn from_slices(slices: BTreeMap<&'static str, SliceValue>) -> Self {
        Self {
            slices: Arc::new(slices),
        }
    }

    /// Typed access to a slice. `None` if the reducer is not part of this store.
    pub fn get<R: Reducer>(&self) -> Option<Arc<R::State>> {
        self.slices
            .get(R::KEY)
            .cloned()
            .and_then(|value| value.downcast::<R::State>().ok())
    }

    /// Typed access to a slice, falling back to its default when the
    /// reducer is not registered.
    pub fn slice<R: Reducer>(&self) -> Arc<R::State> {
        self.get::<R>().unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slices.keys().copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slices.contains_key(key)
    }

    /// True when both snapshots are the very same value.
    pub fn ptr_eq(&self, other: &AppState) -> bool {
        Arc::ptr_eq(&self.slices, &other.slices)
    }

    /// True when the slice under `key` is the same allocation in both snapshots.
    pub fn slice_ptr_eq(&self, other: &AppState, key: &str) -> bool {
        match (self.slices.get(key), other.slices.get(key)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    pub(crate) fn raw(&self, key: &str) -> Option<&SliceValue> {
        self.slices.get(key)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&'static str, &SliceValue)> + '_ {
        self.slices.iter().map(|(key, value)| (*key, value))
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("slices", &self.slices.keys().collect::<Vec<_>>())
            .finish()
    }
}
