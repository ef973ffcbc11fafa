//! # Action Eventifier
//!
//! [`eventify`] wraps one action on one shared resource so that every invocation
//! broadcasts its lifecycle to an [`ActionObserver`]:
//!
//! 1. `Pending` is emitted synchronously by [`EventifiedAction::invoke`], before
//!    the request is dispatched.
//! 2. Each progress report from the transport is emitted as `Notified` and
//!    forwarded on the returned [`ActionTask`].
//! 3. Exactly one of `Resolved` or `Rejected` is emitted once the action settles,
//!    after every `Notified` of that invocation, and the task settles the same way.
//!
//! Any [`ResourceAction`] can be wrapped. [`Action`] covers the four CRUD
//! operations; other actions (a search, a custom endpoint) implement the trait
//! themselves.
//!
//! Errors an action raises before dispatch, such as a missing `self` link, are
//! returned by `invoke` itself right after `Pending`. No task is started for
//! them and no `Rejected` follows.
//!
//! Every invocation gets its own task and its own progress channel; invocations
//! share nothing but the resource and the observer.
//!
//! ```rust,ignore
//! let (events, mut received) = tokio::sync::mpsc::unbounded_channel();
//! let create = eventify(events, note.clone(), Action::Create, http.clone());
//!
//! let task = create.invoke()?;
//! let response = task.outcome().await?;
//! ```

use crate::error::ResourceError;
use crate::http::{HttpClient, HttpResponse, Progress, ProgressSink};
use crate::resource::{Action, Resource};
use crate::shared::SharedResource;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

pub const PENDING: &str = "hateoas.eventify.action.Pending";
pub const RESOLVED: &str = "hateoas.eventify.action.Resolved";
pub const REJECTED: &str = "hateoas.eventify.action.Rejected";
pub const NOTIFIED: &str = "hateoas.eventify.action.Notified";

/// A lifecycle notification for one invocation of a wrapped action.
pub enum ActionEvent<R> {
    Pending {
        action: String,
        resource: SharedResource<R>,
    },
    Resolved {
        action: String,
        resource: SharedResource<R>,
        response: HttpResponse,
    },
    Rejected {
        action: String,
        resource: SharedResource<R>,
        /// The response as received, when the failure came from the server.
        response: Option<HttpResponse>,
        reason: String,
    },
    Notified {
        action: String,
        resource: SharedResource<R>,
        progress: Progress,
    },
}

impl<R> ActionEvent<R> {
    pub fn name(&self) -> &'static str {
        match self {
            ActionEvent::Pending { .. } => PENDING,
            ActionEvent::Resolved { .. } => RESOLVED,
            ActionEvent::Rejected { .. } => REJECTED,
            ActionEvent::Notified { .. } => NOTIFIED,
        }
    }

    /// The name of the action this notification is about.
    pub fn action(&self) -> &str {
        match self {
            ActionEvent::Pending { action, .. }
            | ActionEvent::Resolved { action, .. }
            | ActionEvent::Rejected { action, .. }
            | ActionEvent::Notified { action, .. } => action,
        }
    }

    pub fn resource(&self) -> &SharedResource<R> {
        match self {
            ActionEvent::Pending { resource, .. }
            | ActionEvent::Resolved { resource, .. }
            | ActionEvent::Rejected { resource, .. }
            | ActionEvent::Notified { resource, .. } => resource,
        }
    }
}

impl<R> fmt::Debug for ActionEvent<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.name());
        s.field("action", &self.action());
        match self {
            ActionEvent::Pending { .. } => {}
            ActionEvent::Resolved { response, .. } => {
                s.field("status", &response.status);
            }
            ActionEvent::Rejected {
                response, reason, ..
            } => {
                s.field("status", &response.as_ref().map(|r| r.status));
                s.field("reason", reason);
            }
            ActionEvent::Notified { progress, .. } => {
                s.field("progress", progress);
            }
        }
        s.finish()
    }
}

/// Receives lifecycle notifications.
pub trait ActionObserver<R>: Send + Sync + 'static {
    fn notify(&self, event: ActionEvent<R>);
}

impl<R: Send + 'static> ActionObserver<R> for mpsc::UnboundedSender<ActionEvent<R>> {
    fn notify(&self, event: ActionEvent<R>) {
        // A dropped receiver just means nobody is watching any more.
        let _ = self.send(event);
    }
}

/// Logs every notification through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl<R> ActionObserver<R> for TracingObserver {
    fn notify(&self, event: ActionEvent<R>) {
        match &event {
            ActionEvent::Pending { action, .. } => debug!(event = PENDING, %action),
            ActionEvent::Notified {
                action, progress, ..
            } => debug!(event = NOTIFIED, %action, loaded = progress.loaded),
            ActionEvent::Resolved {
                action, response, ..
            } => info!(event = RESOLVED, %action, status = response.status.as_u16()),
            ActionEvent::Rejected { action, reason, .. } => {
                warn!(event = REJECTED, %action, %reason)
            }
        }
    }
}

/// An action that can be run against a shared resource and eventified.
#[async_trait]
pub trait ResourceAction<R: Resource>: Send + Sync + 'static {
    /// Name carried by every notification of this action.
    fn name(&self) -> &str;

    /// Runs before dispatch; an error here is returned by `invoke` directly.
    fn check(&self, _resource: &SharedResource<R>) -> Result<(), ResourceError> {
        Ok(())
    }

    async fn run(
        &self,
        resource: &SharedResource<R>,
        http: &dyn HttpClient,
        progress: ProgressSink,
    ) -> Result<HttpResponse, ResourceError>;
}

#[async_trait]
impl<R: Resource> ResourceAction<R> for Action {
    fn name(&self) -> &str {
        Action::name(*self)
    }

    fn check(&self, resource: &SharedResource<R>) -> Result<(), ResourceError> {
        resource.with(|r| r.request(*self)).map(drop)
    }

    async fn run(
        &self,
        resource: &SharedResource<R>,
        http: &dyn HttpClient,
        progress: ProgressSink,
    ) -> Result<HttpResponse, ResourceError> {
        resource.perform(*self, http, progress).await
    }
}

/// One action on one resource, wrapped to report its lifecycle.
pub struct EventifiedAction<R: Resource> {
    action: Arc<dyn ResourceAction<R>>,
    resource: SharedResource<R>,
    http: Arc<dyn HttpClient>,
    observer: Arc<dyn ActionObserver<R>>,
}

impl<R: Resource> Clone for EventifiedAction<R> {
    fn clone(&self) -> Self {
        Self {
            action: self.action.clone(),
            resource: self.resource.clone(),
            http: self.http.clone(),
            observer: self.observer.clone(),
        }
    }
}

/// Wraps `action` on `resource` so that its lifecycle is reported to `observer`.
pub fn eventify<R, O, A>(
    observer: O,
    resource: SharedResource<R>,
    action: A,
    http: Arc<dyn HttpClient>,
) -> EventifiedAction<R>
where
    R: Resource,
    O: ActionObserver<R>,
    A: ResourceAction<R>,
{
    EventifiedAction {
        action: Arc::new(action),
        resource,
        http,
        observer: Arc::new(observer),
    }
}

impl<R: Resource> EventifiedAction<R> {
    pub fn action(&self) -> &str {
        self.action.name()
    }

    pub fn resource(&self) -> &SharedResource<R> {
        &self.resource
    }

    /// Emits `Pending`, then runs the action on the current Tokio runtime.
    ///
    /// Fails without starting a task when the action's pre-dispatch check does.
    pub fn invoke(&self) -> Result<ActionTask, ResourceError> {
        let name = self.action.name().to_string();
        self.observer.notify(ActionEvent::Pending {
            action: name.clone(),
            resource: self.resource.clone(),
        });
        if let Err(e) = self.action.check(&self.resource) {
            warn!(action = %name, error = %e, "Action refused before dispatch");
            return Err(e);
        }

        let (forward, progress) = mpsc::unbounded_channel();
        let (settle, outcome) = oneshot::channel();
        let action = self.action.clone();
        let resource = self.resource.clone();
        let http = self.http.clone();
        let observer = self.observer.clone();

        tokio::spawn(async move {
            let (sink, mut reports) = ProgressSink::channel();
            let notify = |progress: Progress| {
                observer.notify(ActionEvent::Notified {
                    action: name.clone(),
                    resource: resource.clone(),
                    progress,
                });
                let _ = forward.send(progress);
            };

            let result = {
                let run = action.run(&resource, http.as_ref(), sink);
                tokio::pin!(run);
                loop {
                    tokio::select! {
                        biased;
                        Some(progress) = reports.recv() => notify(progress),
                        result = &mut run => break result,
                    }
                }
            };
            // Reports that raced the settlement still come first.
            while let Ok(progress) = reports.try_recv() {
                notify(progress);
            }

            match &result {
                Ok(response) => observer.notify(ActionEvent::Resolved {
                    action: name.clone(),
                    resource: resource.clone(),
                    response: response.clone(),
                }),
                Err(e) => observer.notify(ActionEvent::Rejected {
                    action: name.clone(),
                    resource: resource.clone(),
                    response: e.response().cloned(),
                    reason: e.to_string(),
                }),
            }
            let _ = settle.send(result);
        });

        Ok(ActionTask { progress, outcome })
    }
}

/// The caller's side of one eventified invocation.
#[derive(Debug)]
pub struct ActionTask {
    progress: mpsc::UnboundedReceiver<Progress>,
    outcome: oneshot::Receiver<Result<HttpResponse, ResourceError>>,
}

impl ActionTask {
    /// The next progress report, or `None` once the action has settled.
    pub async fn progress(&mut self) -> Option<Progress> {
        self.progress.recv().await
    }

    /// Waits for the action to settle.
    pub async fn outcome(self) -> Result<HttpResponse, ResourceError> {
        self.outcome.await.map_err(|_| ResourceError::Dropped)?
    }
}
