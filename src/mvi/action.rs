//! Actions (user/system events) dispatched into the store.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A tagged message dispatched into the store.
///
/// Actions represent:
/// - User actions (login form submitted, filter changed)
/// - Service results (transactions page loaded)
/// - Lifecycle events (`persist/REHYDRATE`)
///
/// The store only looks at the tag; payload shape is a contract between
/// the producer and the slice reducer that handles the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
}

impl Action {
    /// Create an action without payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
        }
    }

    /// Attach a payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// The action tag, e.g. `"user/login"`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Decode the payload into `T`.
    ///
    /// Fails with [`ReduceError::MissingPayload`] when the action carries none.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, ReduceError> {
        let payload = self
            .payload
            .clone()
            .ok_or_else(|| ReduceError::MissingPayload {
                action: self.kind.clone(),
            })?;
        serde_json::from_value(payload).map_err(|source| ReduceError::InvalidPayload {
            action: self.kind.clone(),
            source,
        })
    }
}

/// Errors a reducer can raise while handling an action.
///
/// A failing reducer leaves the store untouched and the error is returned
/// to the caller of `dispatch`.
#[derive(Debug, Error)]
pub enum ReduceError {
    #[error("Action '{action}' requires a payload")]
    MissingPayload { action: String },

    #[error("Action '{action}' has an invalid payload: {source}")]
    InvalidPayload {
        action: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Action '{action}' rejected: {reason}")]
    Rejected { action: String, reason: String },

    #[error("Slice '{key}' holds a value of an unexpected type")]
    SliceTypeMismatch { key: String },
}
