//! A resource with no fixed fields.
//!
//! [`DynamicResource`] keeps every non-link field of its simplification in an
//! open attribute map. Use it for servers whose payload shape is not known at
//! compile time; prefer a typed [`Resource`] implementation otherwise.

use crate::error::ResourceError;
use crate::resource::{Resource, ResourceBase};
use crate::simplification::{self, Simplification};
use serde::Serialize;
use serde_json::Value;

const LINKS: &str = "links";

#[derive(Debug, Clone, Default)]
pub struct DynamicResource {
    base: ResourceBase,
    attributes: Simplification,
}

impl DynamicResource {
    /// Defaults, then `values` on top. A `links` value replaces the empty link set.
    pub fn new(values: Simplification) -> Result<Self, ResourceError> {
        let mut resource = Self::default();
        resource.desimplify(&values)?;
        Ok(resource)
    }

    pub fn with_base(base: ResourceBase) -> Self {
        Self {
            base,
            attributes: Simplification::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), ResourceError> {
        simplification::put(&mut self.attributes, key, value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.attributes.remove(key)
    }

    pub fn attributes(&self) -> &Simplification {
        &self.attributes
    }
}

impl Resource for DynamicResource {
    fn base(&self) -> &ResourceBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ResourceBase {
        &mut self.base
    }

    fn simplify(&self) -> Result<Simplification, ResourceError> {
        let mut simplification = self.attributes.clone();
        // The base fields win over any attribute of the same name.
        simplification.extend(self.base.simplify()?);
        Ok(simplification)
    }

    fn desimplify(&mut self, simplification: &Simplification) -> Result<(), ResourceError> {
        self.base.desimplify(simplification)?;
        for (key, value) in simplification.iter().filter(|(key, _)| *key != LINKS) {
            self.attributes.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}
