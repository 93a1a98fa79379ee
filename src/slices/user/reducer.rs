use std::sync::Arc;

use serde_json::Value;

use crate::mvi::{Action, ReduceError, Reducer};
use crate::slices::user::intent::{UserIntent, UPDATE};
use crate::slices::user::state::UserState;

pub struct UserReducer;

impl Reducer for UserReducer {
    const KEY: &'static str = "user";
    type State = UserState;

    fn reduce(state: Arc<Self::State>, action: &Action) -> Result<Arc<Self::State>, ReduceError> {
        let Some(intent) = UserIntent::from_action(action)? else {
            return Ok(state);
        };

        match intent {
            UserIntent::Login(user) => Ok(Arc::new(UserState::signed_in(user))),
            UserIntent::Logout => Ok(Arc::new(UserState::default())),
            UserIntent::Update(fields) => {
                let Some(user) = state.current() else {
                    return Err(ReduceError::Rejected {
                        action: UPDATE.to_string(),
                        reason: "no user is signed in".to_string(),
                    });
                };

                let invalid = |source| ReduceError::InvalidPayload {
                    action: UPDATE.to_string(),
                    source,
                };

                // Field-level merge: id/role/token land on the struct,
                // everything else ends up in `profile` through `flatten`.
                let mut merged = match serde_json::to_value(user).map_err(invalid)? {
                    Value::Object(map) => map,
                    other => {
                        return Err(ReduceError::Rejected {
                            action: UPDATE.to_string(),
                            reason: format!("signed-in user is not an object: {other}"),
                        })
                    }
                };
                merged.extend(fields);
                let user = serde_json::from_value(Value::Object(merged)).map_err(invalid)?;
                Ok(Arc::new(UserState::signed_in(user)))
            }
        }
    }
}
