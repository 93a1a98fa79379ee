//! The `user` slice: the authenticated principal.

mod intent;
mod reducer;
mod state;

pub use intent::{UserIntent, LOGIN, LOGOUT, UPDATE};
pub use reducer::UserReducer;
pub use state::{User, UserState};
