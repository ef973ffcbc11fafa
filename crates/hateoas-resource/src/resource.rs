//! # Resource Trait
//!
//! The `Resource` trait is the contract every concrete resource type (a `Note`, a
//! `Person`, ...) implements. It plays the role a base class would play in a
//! dynamic language, but by composition: each type embeds a [`ResourceBase`]
//! holding the fields every resource has (its links and its validation), and
//! the provided methods implement the whole protocol on top of that.
//!
//! A concrete type only has to say where its base lives and how its own fields
//! extend the simplification:
//!
//! ```rust
//! use hateoas_resource::simplification::{assign, put, Simplification};
//! use hateoas_resource::{Resource, ResourceBase, ResourceError};
//!
//! #[derive(Debug, Default)]
//! struct Note {
//!     base: ResourceBase,
//!     message: Option<String>,
//! }
//!
//! impl Resource for Note {
//!     fn base(&self) -> &ResourceBase { &self.base }
//!     fn base_mut(&mut self) -> &mut ResourceBase { &mut self.base }
//!
//!     fn simplify(&self) -> Result<Simplification, ResourceError> {
//!         let mut simplification = self.base.simplify()?;
//!         put(&mut simplification, "message", &self.message)?;
//!         Ok(simplification)
//!     }
//!
//!     fn desimplify(&mut self, simplification: &Simplification) -> Result<(), ResourceError> {
//!         self.base.desimplify(simplification)?;
//!         assign(simplification, "message", &mut self.message)
//!     }
//! }
//! ```
//!
//! # Identity
//! A resource has no id. It *is* wherever its `self` link points, and it is
//! "new" exactly when no `self` link resolves.
//!
//! # Desimplify merges
//! Desimplifying only overwrites fields present in the simplification. Fields
//! the server left out keep their current values.
//!
//! # CRUD
//! | Action | Method | Target | Body | On 2xx | Otherwise |
//! |--------|--------|--------|------|--------|-----------|
//! | create | POST | `self` (or `base_uri()` when there is none) | `serialize()` | `Location` becomes the `self` link, then a JSON object body is desimplified | links untouched, body attributes still applied when usable |
//! | read | GET | `self` | none | body desimplified | untouched |
//! | update | PUT | `self` | `serialize()` | untouched | untouched |
//! | delete | DELETE | `self` | none | links cleared | untouched |
//!
//! Non-2xx responses surface as [`ResourceError::RequestFailed`] carrying the
//! response as received. Settlement is all or nothing: a body that does not fit
//! the resource fails before any field or link changes.

use crate::error::ResourceError;
use crate::http::{HttpClient, HttpRequest, HttpResponse, ProgressSink};
use crate::link::{Link, LinkSet, SELF};
use crate::search::Search;
use crate::simplification::{self, Simplification};
use crate::validation::{Errors, Validation};
use async_trait::async_trait;
use http::header::LOCATION;
use http::Method;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The fields every resource has.
#[derive(Debug, Clone, Default)]
pub struct ResourceBase {
    pub links: LinkSet,
    pub validation: Validation,
}

impl ResourceBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_links(mut self, links: impl Into<LinkSet>) -> Self {
        self.links = links.into();
        self
    }

    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    /// The base simplification: `{ "links": [...] }`.
    pub fn simplify(&self) -> Result<Simplification, ResourceError> {
        let mut simplification = Simplification::new();
        simplification::put(&mut simplification, "links", &self.links)?;
        Ok(simplification)
    }

    /// Takes `links` from the simplification when present.
    pub fn desimplify(&mut self, simplification: &Simplification) -> Result<(), ResourceError> {
        simplification::assign(simplification, "links", &mut self.links)
    }
}

/// The protocol operations a resource can perform against its server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Action::Create => Method::POST,
            Action::Read => Method::GET,
            Action::Update => Method::PUT,
            Action::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait that any HATEOAS resource type must implement.
///
/// Only [`Resource::base`] and [`Resource::base_mut`] are required. Types with
/// fields of their own override [`Resource::simplify`] and
/// [`Resource::desimplify`], calling the base versions first. Types that can be
/// created without a `self` link or searched override [`Resource::base_uri`] and
/// [`Resource::search_uri`].
#[async_trait]
pub trait Resource: Default + Send + Sync + 'static {
    fn base(&self) -> &ResourceBase;

    fn base_mut(&mut self) -> &mut ResourceBase;

    fn simplify(&self) -> Result<Simplification, ResourceError> {
        self.base().simplify()
    }

    fn desimplify(&mut self, simplification: &Simplification) -> Result<(), ResourceError> {
        self.base_mut().desimplify(simplification)
    }

    /// The collection this type is created in, without a trailing slash.
    fn base_uri(&self) -> Result<String, ResourceError> {
        Err(ResourceError::NotImplemented("base_uri"))
    }

    /// The collection this type is searched in, without a trailing slash.
    fn search_uri(&self) -> Result<String, ResourceError> {
        Err(ResourceError::NotImplemented("search_uri"))
    }

    // --- Links ---

    fn links(&self) -> &LinkSet {
        &self.base().links
    }

    fn get_link(&self, relation: &str) -> Result<&str, ResourceError> {
        self.base().links.get_link(relation)
    }

    /// Whether the resource currently has an address on the server.
    fn is_new(&self) -> bool {
        !self.base().links.contains(SELF)
    }

    // --- Wire text ---

    fn serialize(&self) -> Result<String, ResourceError> {
        Ok(serde_json::to_string(&self.simplify()?)?)
    }

    fn deserialize(&mut self, serialization: &str) -> Result<(), ResourceError> {
        let simplification = simplification::parse(serialization)?;
        self.desimplify(&simplification)
    }

    // --- Validation ---

    fn validation(&self) -> &Validation {
        &self.base().validation
    }

    fn validation_mut(&mut self) -> &mut Validation {
        &mut self.base_mut().validation
    }

    fn has_errors(&self) -> Result<bool, ResourceError> {
        Ok(self.validation().has_errors(&self.simplify()?))
    }

    fn get_errors(&self) -> Result<Errors, ResourceError> {
        Ok(self.validation().get_errors(&self.simplify()?))
    }

    fn has_error(&self, property: &str) -> Result<bool, ResourceError> {
        Ok(self
            .get_errors()?
            .get(property)
            .is_some_and(|messages| !messages.is_empty()))
    }

    /// Messages for one property; empty when it passes.
    fn get_error(&self, property: &str) -> Result<Vec<String>, ResourceError> {
        Ok(self.get_errors()?.remove(property).unwrap_or_default())
    }

    // --- Protocol ---

    /// Builds the request `action` would send, without sending it.
    ///
    /// Fails when the target link cannot be resolved. A new resource without a
    /// `self` link is created in its `base_uri()` when the type provides one.
    fn request(&self, action: Action) -> Result<HttpRequest, ResourceError> {
        let url = match (action, self.get_link(SELF)) {
            (_, Ok(href)) => href.to_string(),
            (Action::Create, Err(missing)) => self.base_uri().map_err(|_| missing)?,
            (_, Err(missing)) => return Err(missing),
        };
        let request = HttpRequest::new(action.method(), url);
        match action {
            Action::Create | Action::Update => Ok(request.with_data(self.serialize()?)),
            Action::Read | Action::Delete => Ok(request),
        }
    }

    /// Desimplifies only once a fresh instance has accepted the simplification.
    ///
    /// A simplification with a mistyped field fails here without touching
    /// `self`, so a failed merge leaves the resource as it was.
    fn merge(&mut self, simplification: &Simplification) -> Result<(), ResourceError> {
        Self::default().desimplify(simplification)?;
        self.desimplify(simplification)
    }

    /// Folds a response to `action` back into the resource.
    ///
    /// Returns [`ResourceError::RequestFailed`] for non-2xx responses, after
    /// applying whatever that outcome changes. A successful response whose body
    /// cannot be applied changes nothing and returns the parse error.
    fn settle(&mut self, action: Action, response: &HttpResponse) -> Result<(), ResourceError> {
        if !response.is_success() {
            if action == Action::Create {
                if let Some(body) = object_body(response) {
                    // A rejected create keeps pointing at the create endpoint.
                    let links = self.base().links.clone();
                    if let Err(e) = self.merge(&body) {
                        warn!(%action, error = %e, "Ignoring unusable error body");
                    }
                    self.base_mut().links = links;
                }
            }
            return Err(ResourceError::RequestFailed(Box::new(response.clone())));
        }
        match action {
            Action::Create => {
                // Anything but a JSON object is treated as no body at all.
                let body = object_body(response);
                if let Some(body) = &body {
                    Self::default().desimplify(body)?;
                }
                if let Some(location) = response.header(LOCATION.as_str()) {
                    self.base_mut().links = LinkSet::from(vec![Link::to_self(location)]);
                }
                if let Some(body) = &body {
                    self.desimplify(body)?;
                }
            }
            Action::Read => {
                if response.has_body() {
                    let body = simplification::parse(&response.body)?;
                    self.merge(&body)?;
                }
            }
            Action::Update => {}
            Action::Delete => self.base_mut().links.clear(),
        }
        Ok(())
    }

    /// Sends `action` through `http` and settles the response.
    async fn perform(
        &mut self,
        action: Action,
        http: &dyn HttpClient,
        progress: ProgressSink,
    ) -> Result<HttpResponse, ResourceError> {
        let request = self.request(action)?;
        debug!(%action, method = %request.method, url = %request.url, "Sending request");
        let response = http.send(request, progress).await?;
        match self.settle(action, &response) {
            Ok(()) => {
                info!(%action, status = response.status.as_u16(), "Settled");
                Ok(response)
            }
            Err(e) => {
                warn!(%action, error = %e, "Action failed");
                Err(e)
            }
        }
    }

    async fn create(&mut self, http: &dyn HttpClient) -> Result<HttpResponse, ResourceError> {
        self.perform(Action::Create, http, ProgressSink::none()).await
    }

    async fn read(&mut self, http: &dyn HttpClient) -> Result<HttpResponse, ResourceError> {
        self.perform(Action::Read, http, ProgressSink::none()).await
    }

    async fn update(&mut self, http: &dyn HttpClient) -> Result<HttpResponse, ResourceError> {
        self.perform(Action::Update, http, ProgressSink::none()).await
    }

    async fn delete(&mut self, http: &dyn HttpClient) -> Result<HttpResponse, ResourceError> {
        self.perform(Action::Delete, http, ProgressSink::none()).await
    }

    /// Starts a search in `search_uri()`.
    ///
    /// Returns at once; results accumulate on the returned [`Search`] as the
    /// response is parsed. Must be called within a Tokio runtime.
    fn search(&self, http: Arc<dyn HttpClient>) -> Result<Search<Self>, ResourceError> {
        let url = self.search_uri()?;
        Ok(Search::start(HttpRequest::new(Method::GET, url), http))
    }
}

/// The response body as a simplification, when it is a JSON object.
fn object_body(response: &HttpResponse) -> Option<Simplification> {
    if response.has_body() {
        simplification::parse(&response.body).ok()
    } else {
        None
    }
}
