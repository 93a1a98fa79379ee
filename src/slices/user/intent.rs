use serde_json::{Map, Value};

use crate::mvi::{Action, ReduceError};
use crate::slices::user::state::User;

pub const LOGIN: &str = "user/login";
pub const LOGOUT: &str = "user/logout";
pub const UPDATE: &str = "user/update";

#[derive(Debug, Clone, PartialEq)]
pub enum UserIntent {
    /// Login service succeeded; payload is the principal.
    Login(User),
    Logout,
    /// Merge the given fields into the signed-in user.
    Update(Map<String, Value>),
}

impl UserIntent {
    /// Decode a dispatched action. Actions for other slices yield `None`.
    pub fn from_action(action: &Action) -> Result<Option<Self>, ReduceError> {
        let intent = match action.kind() {
            LOGIN => Self::Login(action.payload_as()?),
            LOGOUT => Self::Logout,
            UPDATE => Self::Update(action.payload_as()?),
            _ => return Ok(None),
        };
        Ok(Some(intent))
    }
}

impl From<UserIntent> for Action {
    fn from(intent: UserIntent) -> Self {
        match intent {
            UserIntent::Login(user) => Action::new(LOGIN)
                .with_payload(serde_json::to_value(user).unwrap_or(Value::Null)),
            UserIntent::Logout => Action::new(LOGOUT),
            UserIntent::Update(fields) => Action::new(UPDATE).with_payload(Value::Object(fields)),
        }
    }
}
