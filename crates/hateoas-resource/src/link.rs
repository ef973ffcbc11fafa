//! # Hypermedia Links
//!
//! A resource is addressed by the links a server handed out, not by a URL
//! template. [`LinkSet`] keeps those links in wire order and resolves a
//! relation name to an `href`.

use crate::error::ResourceError;
use serde::{Deserialize, Serialize};

/// The relation naming a resource's own address.
pub const SELF: &str = "self";

/// A single hypermedia link: one `href` playing one or more relations.
///
/// On the wire this is `{"rel": ["self"], "href": "/notes/1"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "rel")]
    pub relations: Vec<String>,
    pub href: String,
}

impl Link {
    pub fn new<I, S>(relations: I, href: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            relations: relations.into_iter().map(Into::into).collect(),
            href: href.into(),
        }
    }

    /// Shorthand for a link carrying only the `self` relation.
    pub fn to_self(href: impl Into<String>) -> Self {
        Self::new([SELF], href)
    }

    pub fn has_relation(&self, relation: &str) -> bool {
        self.relations.iter().any(|r| r == relation)
    }
}

/// The ordered links attached to a resource.
///
/// Relations may repeat across links; lookups always resolve to the first match
/// in sequence order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkSet(Vec<Link>);

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `relation` to the `href` of the first link carrying it.
    pub fn get_link(&self, relation: &str) -> Result<&str, ResourceError> {
        self.find(relation)
            .map(|link| link.href.as_str())
            .ok_or_else(|| ResourceError::LinkNotFound(relation.to_string()))
    }

    pub fn find(&self, relation: &str) -> Option<&Link> {
        self.0.iter().find(|link| link.has_relation(relation))
    }

    pub fn contains(&self, relation: &str) -> bool {
        self.find(relation).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Link> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl From<Vec<Link>> for LinkSet {
    fn from(links: Vec<Link>) -> Self {
        Self(links)
    }
}

impl FromIterator<Link> for LinkSet {
    fn from_iter<I: IntoIterator<Item = Link>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a LinkSet {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
