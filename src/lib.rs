//! Stockroom - state core of the warehouse dashboard.
//!
//! A reducer store whose `user` slice survives restarts: actions flow
//! through middleware into slice reducers, and a persistence decorator
//! writes the whitelisted part of every new state to durable storage and
//! restores it on boot before the views are allowed to render.
//!
//! # Modules
//!
//! - [`mvi`] - Action, reducer and slice-state primitives
//! - [`slices`] - The `user` and `session` slices
//! - [`store`] - Store, root reducer composition and middleware
//! - [`persist`] - Persistence decorator, storage backends and persistor
//! - [`config`] - Configuration loading and validation
//! - [`app`] - Composition root
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use stockroom::app::App;
//! use stockroom::config::PersistConfig;
//! use stockroom::persist::MemoryStorage;
//! use stockroom::slices::{User, UserIntent, UserReducer};
//!
//! let app = App::build(&PersistConfig::default(), Arc::new(MemoryStorage::new())).unwrap();
//! app.store.dispatch(UserIntent::Login(User::new("u1", "staff"))).unwrap();
//! assert_eq!(app.store.select::<UserReducer>().current().unwrap().id, "u1");
//! ```

pub mod app;
pub mod config;
pub mod logging;
pub mod mvi;
pub mod persist;
pub mod slices;
pub mod store;
