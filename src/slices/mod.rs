//! Domain slices of the dashboard state.

pub mod session;
pub mod user;

pub use session::{SessionIntent, SessionReducer, SessionState, TransactionKind};
pub use user::{User, UserIntent, UserReducer, UserState};

use crate::store::{RootReducer, StoreError};

/// The dashboard's root reducer: `user` and `session`.
pub fn root_reducer() -> Result<RootReducer, StoreError> {
    RootReducer::builder()
        .slice::<UserReducer>()
        .slice::<SessionReducer>()
        .build()
}
