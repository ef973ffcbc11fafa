//! # HATEOAS Resource
//!
//! This crate provides a client-side model for **hypermedia-driven REST
//! resources**: entities addressed not by a URL template but by the links a
//! server hands out in its responses.
//!
//! ## Architecture Overview
//!
//! The crate separates concerns into three layers:
//!
//! 1. **Model Layer** ([`Resource`], [`LinkSet`], [`Validation`]) - your domain types and how they map to the wire
//! 2. **Protocol Layer** ([`Resource::perform`], [`SharedResource`], [`Search`]) - CRUD against a server, settling responses back into state
//! 3. **Notification Layer** ([`eventify`]) - lifecycle events for observers of in-flight actions
//!
//! The transport underneath is an [`HttpClient`] trait object. The crate ships an
//! in-memory server ([`memory`]), mocks for tests ([`mock`]), and, behind the
//! `reqwest` feature, a network client.
//!
//! ## Core Abstractions
//!
//! ### [`Resource`] - The Domain Type
//!
//! A resource embeds a [`ResourceBase`] (its links and validation) and extends the
//! base simplification with its own fields:
//!
//! ```rust
//! use hateoas_resource::simplification::{assign, put, Simplification};
//! use hateoas_resource::memory::MemoryServer;
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
//!
//!     fn base_uri(&self) -> Result<String, ResourceError> {
//!         Ok("/notes".to_string())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ResourceError> {
//!     let (server, http) = MemoryServer::new(10);
//!     tokio::spawn(server.run());
//!
//!     let mut note = Note { message: Some("hello".into()), ..Default::default() };
//!     note.create(&http).await?;
//!     assert_eq!(note.get_link("self")?, "/notes/1");
//!
//!     note.delete(&http).await?;
//!     assert!(note.is_new());
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - Suspension points are exactly the network round trips; link lookup,
//!   (de)simplification and validation are synchronous
//! - A `&mut` resource runs one action at a time; a [`SharedResource`] lets
//!   several run at once, each settling independently (last to settle wins)
//! - There is no cancellation and no retry; timeouts belong to the transport
//!
//! ## Testing
//!
//! The [`mock`] module provides a `MockHttpClient` with fluent expectations and
//! channel helpers for tests that need to control response order.

pub mod dynamic;
pub mod error;
pub mod eventify;
pub mod factory;
pub mod http;
pub mod link;
pub mod memory;
pub mod mock;
#[cfg(feature = "reqwest")]
pub mod reqwest_client;
pub mod resource;
pub mod search;
pub mod shared;
pub mod simplification;
pub mod tracing;
pub mod validation;

// Re-export core types for convenience
pub use dynamic::DynamicResource;
pub use error::ResourceError;
pub use eventify::{
    eventify, ActionEvent, ActionObserver, ActionTask, EventifiedAction, ResourceAction,
    TracingObserver,
};
pub use http::{HttpClient, HttpRequest, HttpResponse, Progress, ProgressSink};
pub use link::{Link, LinkSet, SELF};
#[cfg(feature = "reqwest")]
pub use reqwest_client::ReqwestClient;
pub use resource::{Action, Resource, ResourceBase};
pub use search::{Search, SearchResults};
pub use shared::SharedResource;
pub use simplification::Simplification;
pub use validation::{Check, Errors, ExistenceCheck, PredicateCheck, Validation};
