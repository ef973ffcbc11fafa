//! # Search
//!
//! A search is started synchronously and completes in the background. Callers
//! get a [`Search`] right away: its [`SearchResults`] can be held (and cloned)
//! before the response arrives and grows in response order as items are parsed.
//! The result list is only ever appended to, never replaced.

use crate::error::ResourceError;
use crate::factory;
use crate::http::{HttpClient, HttpRequest, HttpResponse, ProgressSink};
use crate::resource::Resource;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The shared, growing list of resources found by a search.
pub struct SearchResults<R> {
    items: Arc<Mutex<Vec<R>>>,
}

impl<R> Clone for SearchResults<R> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<R> Default for SearchResults<R> {
    fn default() -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<R> SearchResults<R> {
    /// Locks the list. Do not hold the guard across an `.await`.
    pub fn lock(&self) -> MutexGuard<'_, Vec<R>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push(&self, item: R) {
        self.lock().push(item);
    }
}

impl<R: Clone> SearchResults<R> {
    /// A copy of what has been found so far.
    pub fn snapshot(&self) -> Vec<R> {
        self.lock().clone()
    }
}

/// An in-flight search: its results so far and its eventual completion.
pub struct Search<R> {
    results: SearchResults<R>,
    completion: JoinHandle<Result<HttpResponse, ResourceError>>,
}

impl<R: Resource> Search<R> {
    /// Spawns the exchange for `request` on the current Tokio runtime.
    pub fn start(request: HttpRequest, http: Arc<dyn HttpClient>) -> Self {
        let results = SearchResults::default();
        let sink = results.clone();
        let completion = tokio::spawn(async move {
            debug!(url = %request.url, "Searching");
            let response = http.send(request, ProgressSink::none()).await?;
            if !response.is_success() {
                warn!(status = response.status.as_u16(), "Search failed");
                return Err(ResourceError::RequestFailed(Box::new(response)));
            }
            let simplifications: Vec<Value> = serde_json::from_str(&response.body)?;
            for simplification in simplifications {
                sink.push(factory::desimplify_value::<R>(simplification)?);
            }
            info!(found = sink.len(), "Search settled");
            Ok(response)
        });
        Self {
            results,
            completion,
        }
    }
}

impl<R> Search<R> {
    /// A handle on the results, valid before and after completion.
    pub fn results(&self) -> SearchResults<R> {
        self.results.clone()
    }

    /// Waits for the search to settle.
    ///
    /// On failure, items parsed before the failure stay in the results.
    pub async fn completion(self) -> Result<HttpResponse, ResourceError> {
        self.completion.await.map_err(|_| ResourceError::Dropped)?
    }
}
