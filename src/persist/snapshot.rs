//! The persisted projection of the application state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::PersistConfig;
use crate::persist::error::PersistError;
use crate::store::{AppState, RootReducer, SliceValue};

/// Versioned envelope written to storage.
///
/// ```json
/// { "version": 1, "slices": { "user": { "id": "u1", "role": "staff" } } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub version: u32,
    pub slices: Map<String, Value>,
}

impl PersistedSnapshot {
    /// Project `state` onto the whitelisted slices.
    ///
    /// Fails on the first slice that cannot be serialized; a snapshot is
    /// written whole or not at all.
    pub fn project(
        root: &RootReducer,
        config: &PersistConfig,
        state: &AppState,
    ) -> Result<Self, PersistError> {
        let mut slices = Map::new();
        for key in &config.whitelist {
            let (Some(slice), Some(value)) = (root.slice(key), state.raw(key)) else {
                continue;
            };
            let json = slice
                .to_json(value)
                .map_err(|source| PersistError::Serialize {
                    key: key.clone(),
                    source,
                })?;
            slices.insert(key.clone(), json);
        }
        Ok(Self {
            version: config.version,
            slices,
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, PersistError> {
        serde_json::to_vec(self).map_err(|source| PersistError::Serialize {
            key: "snapshot".to_string(),
            source,
        })
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PersistError> {
        serde_json::from_slice(bytes).map_err(|source| PersistError::Corrupt { source })
    }
}

/// Merge inbound slices over `state`, one level deep: each whitelisted
/// inbound key replaces the whole slice.
///
/// Keys that are not whitelisted or not registered are ignored. A slice
/// that fails to decode keeps its current value and is reported.
pub(crate) fn merge_inbound(
    root: &RootReducer,
    config: &PersistConfig,
    state: &AppState,
    inbound: Map<String, Value>,
) -> (AppState, Vec<PersistError>) {
    let mut merged: BTreeMap<&'static str, SliceValue> = state
        .entries()
        .map(|(key, value)| (key, value.clone()))
        .collect();
    let mut errors = Vec::new();
    let mut restored = false;

    for (key, json) in inbound {
        if !config.is_whitelisted(&key) {
            tracing::debug!(slice = %key, "Ignoring non-whitelisted slice in stored snapshot");
            continue;
        }
        let Some(slice) = root.slice(&key) else {
            tracing::debug!(slice = %key, "Ignoring unregistered slice in stored snapshot");
            continue;
        };
        match slice.from_json(json) {
            Ok(value) => {
                merged.insert(slice.key(), value);
                restored = true;
            }
            Err(source) => errors.push(PersistError::Restore { key, source }),
        }
    }

    if restored {
        (AppState::from_slices(merged), errors)
    } else {
        (state.clone(), errors)
    }
}
