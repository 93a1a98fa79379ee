//! Base trait for slice state.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Marker trait for the state held by one slice of the store.
///
/// States should be:
/// - Immutable (reducers build a new value instead of mutating)
/// - Comparable (PartialEq for replay and rehydration checks)
/// - Serializable, so the slice can be put on the persistence allow-list
/// - Defaulted, which is the value a slice starts with on first boot
pub trait SliceState:
    Clone + PartialEq + Debug + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
}
