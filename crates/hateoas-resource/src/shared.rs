//! # Shared Resources
//!
//! [`SharedResource`] lets several tasks and observers refer to the same
//! resource. Its operations lock the resource only to build the request and to
//! settle the response; the lock is never held across the network round trip.
//!
//! **Concurrency Model**:
//! Operations on one resource are *not* serialized. If an `update` and a
//! `delete` are both started before either settles, both requests go out and
//! each one applies its own outcome when it settles, in whatever order the
//! transport completes them. Fields touched by both end up as the last one to
//! settle left them. Callers needing stronger ordering await one operation
//! before starting the next.

use crate::error::ResourceError;
use crate::http::{HttpClient, HttpResponse, ProgressSink};
use crate::resource::{Action, Resource};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// A cloneable reference to one resource.
pub struct SharedResource<R> {
    inner: Arc<Mutex<R>>,
}

impl<R> Clone for SharedResource<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for SharedResource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedResource").field(&*self.lock()).finish()
    }
}

impl<R> SharedResource<R> {
    pub fn new(resource: R) -> Self {
        Self {
            inner: Arc::new(Mutex::new(resource)),
        }
    }

    /// Locks the resource. Do not hold the guard across an `.await`.
    pub fn lock(&self) -> MutexGuard<'_, R> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        f(&self.lock())
    }

    pub fn with_mut<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
        f(&mut self.lock())
    }

    /// Whether both handles refer to the same resource.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<R: Resource> SharedResource<R> {
    /// Sends `action` and settles the response into the shared resource.
    #[tracing::instrument(skip(self, http, progress))]
    pub async fn perform(
        &self,
        action: Action,
        http: &dyn HttpClient,
        progress: ProgressSink,
    ) -> Result<HttpResponse, ResourceError> {
        let request = self.with(|resource| resource.request(action))?;
        debug!(%action, method = %request.method, url = %request.url, "Sending request");
        let response = http.send(request, progress).await?;
        match self.with_mut(|resource| resource.settle(action, &response)) {
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

    pub async fn create(&self, http: &dyn HttpClient) -> Result<HttpResponse, ResourceError> {
        self.perform(Action::Create, http, ProgressSink::none()).await
    }

    pub async fn read(&self, http: &dyn HttpClient) -> Result<HttpResponse, ResourceError> {
        self.perform(Action::Read, http, ProgressSink::none()).await
    }

    pub async fn update(&self, http: &dyn HttpClient) -> Result<HttpResponse, ResourceError> {
        self.perform(Action::Update, http, ProgressSink::none()).await
    }

    pub async fn delete(&self, http: &dyn HttpClient) -> Result<HttpResponse, ResourceError> {
        self.perform(Action::Delete, http, ProgressSink::none()).await
    }
}

impl<R> From<R> for SharedResource<R> {
    fn from(resource: R) -> Self {
        Self::new(resource)
    }
}
