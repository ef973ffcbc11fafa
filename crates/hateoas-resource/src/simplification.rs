//! Helpers for building and merging simplifications.
//!
//! A simplification is the plain JSON object a resource turns into before it goes
//! on the wire. Concrete resources write their fields with [`put`] and read them
//! back with [`assign`], which only touches fields actually present.

use crate::error::ResourceError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// The wire-ready representation of a resource.
pub type Simplification = Map<String, Value>;

/// Writes `value` under `key`.
pub fn put<T: Serialize + ?Sized>(
    simplification: &mut Simplification,
    key: &str,
    value: &T,
) -> Result<(), ResourceError> {
    simplification.insert(key.to_string(), serde_json::to_value(value)?);
    Ok(())
}

/// Reads `key` as a `T`, or `None` when the key is absent.
pub fn take<T: DeserializeOwned>(
    simplification: &Simplification,
    key: &str,
) -> Result<Option<T>, ResourceError> {
    simplification
        .get(key)
        .map(|value| serde_json::from_value(value.clone()))
        .transpose()
        .map_err(ResourceError::from)
}

/// Overwrites `field` with `key` if the simplification carries it.
///
/// Absent keys leave the field untouched; an explicit `null` is still a value
/// and is assigned when `T` accepts it.
pub fn assign<T: DeserializeOwned>(
    simplification: &Simplification,
    key: &str,
    field: &mut T,
) -> Result<(), ResourceError> {
    if let Some(value) = take(simplification, key)? {
        *field = value;
    }
    Ok(())
}

/// Parses wire text into a simplification.
pub fn parse(text: &str) -> Result<Simplification, ResourceError> {
    Ok(serde_json::from_str(text)?)
}
