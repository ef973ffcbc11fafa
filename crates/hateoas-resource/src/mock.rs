//! # Mock Transports & Testing Guide
//!
//! Two ways to test code that talks to a server without one.
//!
//! | Feature | MockHttpClient | create_mock_http |
//! |---------|----------------|------------------|
//! | **Style** | Fluent expectations, answered in order | Test answers each exchange by hand |
//! | **Determinism** | 100% deterministic | Test decides completion order |
//! | **Use Case** | Protocol tests of a single resource | Interleaving and concurrency tests |
//!
//! ## Pattern 0: Expectations
//!
//! ```rust
//! use hateoas_resource::mock::MockHttpClient;
//! use hateoas_resource::{DynamicResource, Link, Resource, ResourceBase};
//! use http::{Method, StatusCode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let http = MockHttpClient::new();
//!     http.expect(Method::DELETE, "/resource/1").respond(StatusCode::ACCEPTED, "");
//!
//!     let base = ResourceBase::new().with_links(vec![Link::to_self("/resource/1")]);
//!     let mut resource = DynamicResource::with_base(base);
//!     resource.delete(&http).await.unwrap();
//!
//!     assert!(resource.links().is_empty());
//!     http.verify();
//! }
//! ```
//!
//! ## Pattern 1: Answering by hand
//!
//! ```rust
//! use hateoas_resource::mock::{create_mock_http, expect_request};
//! use hateoas_resource::{HttpClient, HttpRequest, HttpResponse, ProgressSink};
//! use http::{Method, StatusCode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (http, mut exchanges) = create_mock_http(10);
//!
//!     let task = tokio::spawn(async move {
//!         http.send(HttpRequest::new(Method::GET, "/notes/1"), ProgressSink::none()).await
//!     });
//!
//!     let exchange = expect_request(&mut exchanges).await.expect("Expected a request");
//!     assert_eq!(exchange.request.url, "/notes/1");
//!     exchange.respond_to.send(Ok(HttpResponse::new(StatusCode::NOT_FOUND, ""))).unwrap();
//!
//!     let response = task.await.unwrap().unwrap();
//!     assert_eq!(response.status, StatusCode::NOT_FOUND);
//! }
//! ```

use crate::error::ResourceError;
use crate::http::{HttpClient, HttpRequest, HttpResponse, Progress, ProgressSink};
use crate::memory::{ChannelHttpClient, Exchange};
use async_trait::async_trait;
use http::header::HeaderName;
use http::{HeaderValue, Method, StatusCode};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected request and the answer to give it.
struct Expectation {
    method: Method,
    url: String,
    progress: Vec<Progress>,
    response: Result<HttpResponse, ResourceError>,
}

#[derive(Default)]
struct State {
    expectations: VecDeque<Expectation>,
    received: Vec<HttpRequest>,
}

/// A transport answering from a queue of expectations.
///
/// Requests must arrive in the order they were expected; anything else panics.
#[derive(Clone, Default)]
pub struct MockHttpClient {
    state: Arc<Mutex<State>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Expects a request with `method` to `url`.
    pub fn expect(&self, method: Method, url: impl Into<String>) -> ExpectationBuilder {
        ExpectationBuilder {
            method,
            url: url.into(),
            response: HttpResponse::new(StatusCode::OK, ""),
            progress: Vec::new(),
            state: self.state.clone(),
        }
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state().received.clone()
    }

    /// Panics unless every expectation was met.
    pub fn verify(&self) {
        let state = self.state();
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn send(
        &self,
        request: HttpRequest,
        progress: ProgressSink,
    ) -> Result<HttpResponse, ResourceError> {
        let expectation = {
            let mut state = self.state();
            state.received.push(request.clone());
            state.expectations.pop_front()
        };
        let Some(expectation) = expectation else {
            panic!("Unexpected request: {} {}", request.method, request.url);
        };
        if expectation.method != request.method || expectation.url != request.url {
            panic!(
                "Expected {} {}, got {} {}",
                expectation.method, expectation.url, request.method, request.url
            );
        }
        for report in expectation.progress {
            progress.notify(report);
        }
        expectation.response
    }
}

/// Builder for one expectation; nothing is queued until a `respond*` call.
pub struct ExpectationBuilder {
    method: Method,
    url: String,
    response: HttpResponse,
    progress: Vec<Progress>,
    state: Arc<Mutex<State>>,
}

impl ExpectationBuilder {
    /// Adds a response header. `name` must be lowercase.
    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.response.headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
        self
    }

    /// Progress reports delivered before the response.
    pub fn with_progress(mut self, progress: impl IntoIterator<Item = Progress>) -> Self {
        self.progress.extend(progress);
        self
    }

    /// Answers with `status` and `body`.
    pub fn respond(mut self, status: StatusCode, body: impl Into<String>) {
        self.response.status = status;
        self.response.body = body.into();
        let response = Ok(self.response.clone());
        self.push(response);
    }

    /// Answers with a JSON body.
    pub fn respond_json(self, status: StatusCode, body: &serde_json::Value) {
        self.respond(status, body.to_string());
    }

    /// Fails the exchange without any response.
    pub fn fail(self, error: ResourceError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<HttpResponse, ResourceError>) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.expectations.push_back(Expectation {
            method: self.method,
            url: self.url,
            progress: self.progress,
            response,
        });
    }
}

// =============================================================================
// CHANNEL HELPERS
// =============================================================================

/// Creates a client whose exchanges arrive on the returned receiver.
///
/// Nothing answers them automatically: the test takes each [`Exchange`] and
/// replies through `respond_to`, in whatever order it likes.
pub fn create_mock_http(buffer_size: usize) -> (ChannelHttpClient, mpsc::Receiver<Exchange>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ChannelHttpClient::new(sender), receiver)
}

/// Waits for the next exchange.
pub async fn expect_request(receiver: &mut mpsc::Receiver<Exchange>) -> Option<Exchange> {
    receiver.recv().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_expectations_answer_in_order() {
        let http = MockHttpClient::new();
        http.expect(Method::POST, "/notes")
            .with_header("location", "/notes/1")
            .respond(StatusCode::CREATED, "{}");
        http.expect(Method::GET, "/notes/1")
            .respond(StatusCode::NOT_FOUND, "");

        let created = http
            .send(
                HttpRequest::new(Method::POST, "/notes").with_data("{}"),
                ProgressSink::none(),
            )
            .await
            .unwrap();
        assert_eq!(created.header("location"), Some("/notes/1"));

        let missing = http
            .send(HttpRequest::new(Method::GET, "/notes/1"), ProgressSink::none())
            .await
            .unwrap();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        http.verify();
        assert_eq!(http.requests().len(), 2);
        assert_eq!(http.requests()[0].data.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_progress_precedes_response() {
        let http = MockHttpClient::new();
        http.expect(Method::GET, "/big")
            .with_progress([
                Progress { loaded: 5, total: Some(10) },
                Progress { loaded: 10, total: Some(10) },
            ])
            .respond(StatusCode::OK, "[]");

        let (sink, mut reports) = ProgressSink::channel();
        http.send(HttpRequest::new(Method::GET, "/big"), sink)
            .await
            .unwrap();
        assert_eq!(reports.recv().await.unwrap().loaded, 5);
        assert_eq!(reports.recv().await.unwrap().loaded, 10);
    }

    #[tokio::test]
    async fn test_fail_surfaces_transport_error() {
        let http = MockHttpClient::new();
        http.expect(Method::GET, "/x")
            .fail(ResourceError::Transport("connection reset".into()));
        let result = http
            .send(HttpRequest::new(Method::GET, "/x"), ProgressSink::none())
            .await;
        assert!(matches!(result, Err(ResourceError::Transport(_))));
    }

    #[tokio::test]
    #[should_panic(expected = "Not all expectations were met")]
    async fn test_verify_panics_on_leftovers() {
        let http = MockHttpClient::new();
        http.expect(Method::GET, "/x").respond(StatusCode::OK, "");
        http.verify();
    }
}
