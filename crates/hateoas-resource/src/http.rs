//! # HTTP Capability
//!
//! The resource model never talks to a network library directly. It builds an
//! [`HttpRequest`], hands it to an [`HttpClient`], and folds the resulting
//! [`HttpResponse`] back into resource state.
//!
//! A transport reports any response it received as `Ok`, whatever the status;
//! classifying 2xx versus failure is the resource's job. `Err` is reserved for
//! exchanges that produced no response at all.
//!
//! Transports that can observe a body streaming in report it through the
//! [`ProgressSink`] they are handed.

use crate::error::ResourceError;
use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use tokio::sync::mpsc;

/// A request as the resource model describes it.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: Method,
    /// Serialized request body, when the method carries one.
    pub data: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            data: None,
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// A response as received from the transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Any 2xx.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Looks up a header by name, case-insensitively.
    ///
    /// Values that are not visible ASCII are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Whether the body carries anything besides whitespace.
    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }
}

/// An intermediate progress report for an in-flight exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub loaded: u64,
    pub total: Option<u64>,
}

/// Where a transport reports progress. Cheap to clone; may be disconnected.
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    sender: Option<mpsc::UnboundedSender<Progress>>,
}

impl ProgressSink {
    /// A sink that discards every report.
    pub fn none() -> Self {
        Self::default()
    }

    /// A connected sink and the receiver its reports arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Progress>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    pub fn notify(&self, progress: Progress) {
        if let Some(sender) = &self.sender {
            // Nobody listening is fine.
            let _ = sender.send(progress);
        }
    }
}

/// The request primitive the resource model is written against.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(
        &self,
        request: HttpRequest,
        progress: ProgressSink,
    ) -> Result<HttpResponse, ResourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::LOCATION;
    use http::HeaderValue;

    #[test]
    fn test_success_is_any_2xx() {
        assert!(HttpResponse::new(StatusCode::OK, "").is_success());
        assert!(HttpResponse::new(StatusCode::ACCEPTED, "").is_success());
        assert!(!HttpResponse::new(StatusCode::FOUND, "").is_success());
        assert!(!HttpResponse::new(StatusCode::FORBIDDEN, "").is_success());
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let mut response = HttpResponse::new(StatusCode::CREATED, "");
        response
            .headers
            .insert(LOCATION, HeaderValue::from_static("/resource/1"));
        assert_eq!(response.header("Location"), Some("/resource/1"));
        assert_eq!(response.header("etag"), None);
    }

    #[tokio::test]
    async fn test_progress_sink_delivers_in_order() {
        let (sink, mut receiver) = ProgressSink::channel();
        sink.notify(Progress { loaded: 1, total: Some(2) });
        sink.notify(Progress { loaded: 2, total: Some(2) });
        drop(sink);

        assert_eq!(receiver.recv().await.unwrap().loaded, 1);
        assert_eq!(receiver.recv().await.unwrap().loaded, 2);
        assert!(receiver.recv().await.is_none());
    }

    #[test]
    fn test_disconnected_sink_is_silent() {
        ProgressSink::none().notify(Progress { loaded: 0, total: None });
    }
}
