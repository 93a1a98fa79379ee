use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mvi::SliceState;

/// The authenticated principal.
///
/// `id` and `role` are what the dashboard routes on; any other profile
/// fields returned by the login service are kept verbatim in `profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl User {
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            token: None,
            profile: Map::new(),
        }
    }
}

/// State of the `user` slice. `None` while unauthenticated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserState(Option<User>);

impl SliceState for UserState {}

impl UserState {
    pub fn signed_in(user: User) -> Self {
        Self(Some(user))
    }

    pub fn current(&self) -> Option<&User> {
        self.0.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}
