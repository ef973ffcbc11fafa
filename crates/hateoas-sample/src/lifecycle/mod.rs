//! # System Lifecycle
//!
//! [`ResourceSystem`] starts the in-memory HATEOAS server and hands out the
//! transport every resource in the application talks through.
//!
//! ```rust,ignore
//! let system = ResourceSystem::new(&SampleConfig::default());
//!
//! let mut note = Note::new("Groceries", "milk");
//! note.create(system.http()).await?;
//!
//! system.shutdown().await?;
//! ```
//!
//! ## Graceful Shutdown
//!
//! 1. **Drop the transport** - closes the sending side of the server's channel
//! 2. **Server detects closure** - `receiver.recv()` returns `None`
//! 3. **Server logs its final size** and its task finishes
//! 4. **Await completion** - [`ResourceSystem::shutdown`] joins the task
//!
//! Clones of the transport handed out through [`ResourceSystem::shared_http`]
//! (to searches or eventified actions) keep the server alive until they are
//! dropped too.

use crate::config::SampleConfig;
use hateoas_resource::memory::MemoryServer;
use hateoas_resource::HttpClient;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Debug, thiserror::Error)]
#[error("Server task failed: {0}")]
pub struct ShutdownError(#[from] tokio::task::JoinError);

pub struct ResourceSystem {
    http: Arc<dyn HttpClient>,
    server: JoinHandle<()>,
}

impl ResourceSystem {
    /// Starts the server on the current Tokio runtime.
    pub fn new(config: &SampleConfig) -> Self {
        let (server, client) = MemoryServer::new(config.server_buffer);
        let server = tokio::spawn(server.run());
        info!(buffer = config.server_buffer, "Resource system started");
        Self {
            http: Arc::new(client),
            server,
        }
    }

    pub fn http(&self) -> &dyn HttpClient {
        self.http.as_ref()
    }

    /// An owned handle on the transport, for work that outlives a borrow.
    pub fn shared_http(&self) -> Arc<dyn HttpClient> {
        self.http.clone()
    }

    /// Closes the transport and waits for the server to finish.
    pub async fn shutdown(self) -> Result<(), ShutdownError> {
        info!("Shutting down resource system");
        drop(self.http);
        self.server.await?;
        info!("Resource system stopped");
        Ok(())
    }
}
