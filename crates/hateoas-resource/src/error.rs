//! # Resource Errors
//!
//! Every fallible operation in this crate returns a [`ResourceError`]. Addressing
//! errors (a missing link, an abstract hook) are returned before any request is
//! dispatched. Request failures carry the transport's response untouched.

use crate::http::HttpResponse;

/// Errors that can occur while addressing, (de)serializing or exchanging a resource.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// No link in the link set carries the requested relation.
    #[error("Link not found: {0}")]
    LinkNotFound(String),

    /// An abstract hook (`base_uri`, `search_uri`) was not overridden.
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// The server answered with a non-2xx status.
    #[error("Request failed with status {}", .0.status)]
    RequestFailed(Box<HttpResponse>),

    /// Wire text or a simplification field could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The transport could not complete the exchange at all.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The task driving an action went away before settling.
    #[error("Action dropped before settling")]
    Dropped,
}

impl ResourceError {
    /// The verbatim response of a failed request, if this error carries one.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            ResourceError::RequestFailed(response) => Some(response),
            _ => None,
        }
    }
}
