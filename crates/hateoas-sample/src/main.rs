//! # HATEOAS Sample
//!
//! A walk through the resource model against the in-memory server.
//!
//! ## Core Components
//!
//! - **[model](hateoas_sample::model)**: Typed resources ([`Note`], [`Person`]) implementing the `Resource` trait.
//! - **[lifecycle](hateoas_sample::lifecycle)**: [`ResourceSystem`], which owns the server task and the transport.
//! - **[config](hateoas_sample::config)**: [`SampleConfig`], read from the environment.
//!
//! ## Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run -p hateoas-sample
//! RUST_LOG=debug HATEOAS_COLLECTION=/links cargo run -p hateoas-sample
//! ```
//!
//! The demo:
//! 1.  Creates, updates, reads and deletes a [`Note`] through eventified actions.
//! 2.  Creates a few [`Person`] resources and finds them again with a search.
//! 3.  Stores an untyped bookmark in the configured collection.

use hateoas_resource::eventify::TracingObserver;
use hateoas_resource::tracing::setup_tracing;
use hateoas_resource::{
    eventify, Action, DynamicResource, Link, Resource, ResourceBase, SharedResource, SELF,
};
use hateoas_sample::config::SampleConfig;
use hateoas_sample::lifecycle::ResourceSystem;
use hateoas_sample::model::{Note, Person};
use tracing::{error, info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = SampleConfig::from_env().map_err(|e| e.to_string())?;
    info!(?config, "Starting HATEOAS sample");

    let system = ResourceSystem::new(&config);

    let span = tracing::info_span!("note_lifecycle");
    async {
        let note = SharedResource::new(Note::new("Groceries", "milk"));
        let http = system.shared_http();

        eventify(TracingObserver, note.clone(), Action::Create, http.clone())
            .invoke()
            .map_err(|e| e.to_string())?
            .outcome()
            .await
            .map_err(|e| e.to_string())?;
        let href = note
            .with(|n| n.get_link(SELF).map(str::to_string))
            .map_err(|e| e.to_string())?;
        info!(%href, "Note created");

        note.with_mut(|n| n.message = Some("milk, eggs".to_string()));
        eventify(TracingObserver, note.clone(), Action::Update, http.clone())
            .invoke()
            .map_err(|e| e.to_string())?
            .outcome()
            .await
            .map_err(|e| e.to_string())?;

        note.with_mut(|n| n.message = None);
        note.read(system.http()).await.map_err(|e| e.to_string())?;
        info!(message = ?note.with(|n| n.message.clone()), "Note read back");

        let delete = eventify(TracingObserver, note.clone(), Action::Delete, http.clone());
        delete
            .invoke()
            .map_err(|e| e.to_string())?
            .outcome()
            .await
            .map_err(|e| e.to_string())?;
        info!(is_new = note.with(|n| n.is_new()), "Note deleted");

        // A second delete has nowhere to go.
        match delete.invoke() {
            Ok(task) => {
                if let Err(e) = task.outcome().await {
                    warn!(error = %e, "Second delete rejected");
                }
            }
            Err(e) => warn!(error = %e, "Second delete refused"),
        }
        Ok::<(), String>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("people");
    async {
        let mut nobody = Person::default();
        if nobody.has_errors().map_err(|e| e.to_string())? {
            let errors = nobody.get_errors().map_err(|e| e.to_string())?;
            warn!(?errors, "Refusing to create an invalid person");
        }
        nobody.name = Some("Grace".to_string());

        for mut person in [
            Person::new("Ada").with_email("ada@example.com").with_age(36),
            nobody,
        ] {
            person.create(system.http()).await.map_err(|e| e.to_string())?;
        }

        let search = Person::default()
            .search(system.shared_http())
            .map_err(|e| e.to_string())?;
        let results = search.results();
        search.completion().await.map_err(|e| e.to_string())?;
        for person in results.snapshot() {
            info!(name = ?person.name, href = ?person.get_link(SELF).ok(), "Found person");
        }
        Ok::<(), String>(())
    }
    .instrument(span)
    .await?;

    let base = ResourceBase::new().with_links(vec![Link::to_self(config.collection.as_str())]);
    let mut bookmark = DynamicResource::with_base(base);
    bookmark
        .set("url", "https://www.rust-lang.org")
        .map_err(|e| e.to_string())?;
    match bookmark.create(system.http()).await {
        Ok(_) => info!(href = ?bookmark.get_link(SELF).ok(), "Bookmark stored"),
        Err(e) => error!(error = %e, "Bookmark creation failed"),
    }

    // Shutdown system gracefully
    system.shutdown().await.map_err(|e| e.to_string())?;

    info!("Application completed successfully");
    Ok(())
}
