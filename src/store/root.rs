//! Composition of slice reducers into the root reducer.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;

use crate::mvi::{Action, ReduceError, Reducer};
use crate::store::app_state::{AppState, SliceValue};
use crate::store::error::StoreError;

/// Anything the store can dispatch through: the plain root reducer or a
/// decorator around it.
pub trait StateReducer: Send + Sync {
    /// State the store starts with before any action.
    fn initial_state(&self) -> AppState;

    /// Compute the next state. Returns `state` itself (same pointer) when
    /// no slice changed.
    fn reduce(&self, state: &AppState, action: &Action) -> Result<AppState, ReduceError>;
}

/// Object-safe view of a [`Reducer`], so slices with different state
/// types can live in one root reducer.
pub(crate) trait ErasedSlice: Send + Sync {
    fn key(&self) -> &'static str;
    fn initial(&self) -> SliceValue;
    fn reduce(&self, value: &SliceValue, action: &Action) -> Result<SliceValue, ReduceError>;
    fn to_json(&self, value: &SliceValue) -> Result<Value, serde_json::Error>;
    fn from_json(&self, json: Value) -> Result<SliceValue, serde_json::Error>;
}

struct SliceEntry<R>(PhantomData<fn() -> R>);

impl<R: Reducer> SliceEntry<R> {
    fn typed(value: &SliceValue) -> Result<Arc<R::State>, ReduceError> {
        value
            .clone()
            .downcast::<R::State>()
            .map_err(|_| ReduceError::SliceTypeMismatch {
                key: R::KEY.to_string(),
            })
    }
}

impl<R: Reducer> ErasedSlice for SliceEntry<R> {
    fn key(&self) -> &'static str {
        R::KEY
    }

    fn initial(&self) -> SliceValue {
        Arc::new(R::State::default())
    }

    fn reduce(&self, value: &SliceValue, action: &Action) -> Result<SliceValue, ReduceError> {
        let current = Self::typed(value)?;
        let next = R::reduce(current.clone(), action)?;
        if Arc::ptr_eq(&current, &next) {
            Ok(value.clone())
        } else {
            Ok(next as SliceValue)
        }
    }

    fn to_json(&self, value: &SliceValue) -> Result<Value, serde_json::Error> {
        match value.clone().downcast::<R::State>() {
            Ok(state) => serde_json::to_value(&*state),
            Err(_) => Err(serde::ser::Error::custom(format!(
                "slice '{}' holds a value of an unexpected type",
                R::KEY
            ))),
        }
    }

    fn from_json(&self, json: Value) -> Result<SliceValue, serde_json::Error> {
        let state: R::State = serde_json::from_value(json)?;
        Ok(Arc::new(state) as SliceValue)
    }
}

/// Applies every registered slice reducer to its own key.
pub struct RootReducer {
    slices: Vec<Box<dyn ErasedSlice>>,
}

impl RootReducer {
    pub fn builder() -> RootReducerBuilder {
        RootReducerBuilder {
            slices: Vec::new(),
        }
    }

    /// Registered slice keys, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slices.iter().map(|slice| slice.key())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slice(key).is_some()
    }

    pub(crate) fn slice(&self, key: &str) -> Option<&dyn ErasedSlice> {
        self.slices
            .iter()
            .find(|slice| slice.key() == key)
            .map(|slice| slice.as_ref())
    }
}

impl StateReducer for RootReducer {
    fn initial_state(&self) -> AppState {
        let slices = self
            .slices
            .iter()
            .map(|slice| (slice.key(), slice.initial()))
            .collect();
        AppState::from_slices(slices)
    }

    fn reduce(&self, state: &AppState, action: &Action) -> Result<AppState, ReduceError> {
        let mut next = BTreeMap::new();
        let mut changed = false;

        for slice in &self.slices {
            let value = match state.raw(slice.key()) {
                Some(current) => {
                    let reduced = slice.reduce(current, action)?;
                    changed |= !Arc::ptr_eq(current, &reduced);
                    reduced
                }
                None => {
                    changed = true;
                    slice.reduce(&slice.initial(), action)?
                }
            };
            next.insert(slice.key(), value);
        }

        if changed {
            Ok(AppState::from_slices(next))
        } else {
            Ok(state.clone())
        }
    }
}

pub struct RootReducerBuilder {
    slices: Vec<Box<dyn ErasedSlice>>,
}

impl RootReducerBuilder {
    /// Register a slice reducer under its `KEY`.
    pub fn slice<R: Reducer>(mut self) -> Self {
        self.slices.push(Box::new(SliceEntry::<R>(PhantomData)));
        self
    }

    /// Fails if two reducers share a key.
    pub fn build(self) -> Result<RootReducer, StoreError> {
        for (index, slice) in self.slices.iter().enumerate() {
            if self.slices[..index].iter().any(|s| s.key() == slice.key()) {
                return Err(StoreError::DuplicateSlice {
                    key: slice.key().to_string(),
                });
            }
        }
        Ok(RootReducer {
            slices: self.slices,
        })
    }
}
