//! # Observability & Tracing
//!
//! Everything in this crate logs through `tracing` with structured fields:
//!
//! - **Dispatch** (`debug`): `action`, `method` and `url` of every request
//! - **Settlement** (`info`): `action` and `status` when an action succeeds
//! - **Failure** (`warn`): `action` and `error` when it does not
//! - **Eventifier** ([`TracingObserver`](crate::eventify::TracingObserver)):
//!   every `Pending`/`Notified`/`Resolved`/`Rejected` notification
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run      # Settlements only
//! RUST_LOG=debug cargo run     # Every request and notification
//! RUST_LOG=hateoas_resource=debug,hateoas_sample=info cargo run
//! ```

/// Initializes structured logging for an application.
///
/// Filtering comes from `RUST_LOG`; output uses the compact format without
/// module targets. Call once, early in `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
