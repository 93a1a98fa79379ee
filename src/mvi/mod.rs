//! Unidirectional data flow primitives.
//!
//! # Architecture
//!
//! ```text
//! Action ──→ Reducer ──→ State ──→ View
//!    ↑                              │
//!    └──────────────────────────────┘
//! ```
//!
//! - **State**: immutable value owned by one slice of the store
//! - **Action**: tagged message produced by views and services
//! - **Reducer**: pure function that maps `(state, action)` to the next state

mod action;
mod reducer;
mod state;

pub use action::{Action, ReduceError};
pub use reducer::Reducer;
pub use state::SliceState;
