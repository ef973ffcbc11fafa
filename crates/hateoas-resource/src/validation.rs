//! # Validation
//!
//! Resources do not validate themselves; they carry a [`Validation`] into which
//! callers register [`Check`]s. The resource only asks two questions of it:
//! [`Validation::has_errors`] and [`Validation::get_errors`], both evaluated
//! against the resource's current simplification.
//!
//! Validation failures are state, not errors. Nothing in the CRUD protocol
//! consults them; callers check before sending if they want to.

use crate::simplification::Simplification;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Failing properties mapped to their messages, in registration order.
pub type Errors = BTreeMap<String, Vec<String>>;

/// A single rule about one property of a simplification.
pub trait Check: Send + Sync {
    /// The property this check reports against.
    fn property(&self) -> &str;

    fn is_valid(&self, target: &Simplification) -> bool;

    /// Human-readable message used when the check fails.
    fn message(&self, target: &Simplification) -> String;
}

/// An ordered collection of checks.
///
/// Cloning shares the registered checks.
#[derive(Clone, Default)]
pub struct Validation {
    checks: Vec<Arc<dyn Check>>,
}

impl Validation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, check: impl Check + 'static) -> &mut Self {
        self.checks.push(Arc::new(check));
        self
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn has_errors(&self, target: &Simplification) -> bool {
        self.checks.iter().any(|check| !check.is_valid(target))
    }

    /// Collects the messages of every failing check, keyed by property.
    ///
    /// Properties whose checks all pass do not appear.
    pub fn get_errors(&self, target: &Simplification) -> Errors {
        let mut errors = Errors::new();
        for check in self.checks.iter().filter(|c| !c.is_valid(target)) {
            errors
                .entry(check.property().to_string())
                .or_default()
                .push(check.message(target));
        }
        errors
    }
}

impl fmt::Debug for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let properties: Vec<&str> = self.checks.iter().map(|c| c.property()).collect();
        f.debug_struct("Validation")
            .field("checks", &properties)
            .finish()
    }
}

/// Fails when the property is absent or `null`.
#[derive(Debug, Clone)]
pub struct ExistenceCheck {
    property: String,
    message: Option<String>,
}

impl ExistenceCheck {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Check for ExistenceCheck {
    fn property(&self) -> &str {
        &self.property
    }

    fn is_valid(&self, target: &Simplification) -> bool {
        !matches!(target.get(&self.property), None | Some(Value::Null))
    }

    fn message(&self, _target: &Simplification) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| format!("{} must exist", self.property))
    }
}

type Predicate = dyn Fn(Option<&Value>) -> bool + Send + Sync;

/// Runs an arbitrary predicate over a property's value.
pub struct PredicateCheck {
    property: String,
    message: String,
    predicate: Box<Predicate>,
}

impl PredicateCheck {
    pub fn new<F>(property: impl Into<String>, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    {
        Self {
            property: property.into(),
            message: message.into(),
            predicate: Box::new(predicate),
        }
    }
}

impl Check for PredicateCheck {
    fn property(&self) -> &str {
        &self.property
    }

    fn is_valid(&self, target: &Simplification) -> bool {
        (self.predicate)(target.get(&self.property))
    }

    fn message(&self, _target: &Simplification) -> String {
        self.message.clone()
    }
}
