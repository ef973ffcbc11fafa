//! Constructors that turn wire data into fresh, typed resources.
//!
//! These are the entry points for a server response when there is no existing
//! instance to desimplify into: a new default instance is built and the data
//! applied over it.

use crate::error::ResourceError;
use crate::resource::Resource;
use crate::simplification::Simplification;
use serde_json::Value;

/// Builds an `R` from a simplification.
pub fn desimplify<R: Resource>(simplification: &Simplification) -> Result<R, ResourceError> {
    let mut resource = R::default();
    resource.desimplify(simplification)?;
    Ok(resource)
}

/// Builds an `R` from wire text.
pub fn deserialize<R: Resource>(serialization: &str) -> Result<R, ResourceError> {
    let mut resource = R::default();
    resource.deserialize(serialization)?;
    Ok(resource)
}

/// Builds an `R` from an already parsed JSON value, which must be an object.
pub fn desimplify_value<R: Resource>(value: Value) -> Result<R, ResourceError> {
    let simplification: Simplification = serde_json::from_value(value)?;
    desimplify(&simplification)
}

/// Builds one `R` per element of a JSON array, in order.
pub fn desimplify_all<R: Resource>(serialization: &str) -> Result<Vec<R>, ResourceError> {
    let values: Vec<Value> = serde_json::from_str(serialization)?;
    values.into_iter().map(desimplify_value::<R>).collect()
}
