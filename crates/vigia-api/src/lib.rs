//! JSON REST API for Vigia.
//!
//! Exposes an axum [`Router`] backed by any [`vigia_core::store::RecordStore`].
//! Auth, permission gating, TLS, and transport concerns are the caller's
//! responsibility — see `vigia-server` for the gated deployment.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", vigia_api::api_router(store.clone()))
//! ```

pub mod dashboard;
pub mod error;
pub mod people;
pub mod records;
pub mod requirements;
pub mod search;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, put},
};
use vigia_core::store::RecordStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // People
    .route("/people", get(people::list::<S>).post(people::create::<S>))
    .route("/people/{id}", get(people::get_one::<S>))
    // Requirements
    .route(
      "/requirements",
      get(requirements::list::<S>).post(requirements::create::<S>),
    )
    .route("/requirements/{id}", get(requirements::get_one::<S>))
    // Records
    .route("/records", get(records::list::<S>).post(records::create::<S>))
    .route(
      "/records/{id}",
      get(records::get_one::<S>).delete(records::delete_one::<S>),
    )
    .route("/records/{id}/dates", put(records::update_dates::<S>))
    .route(
      "/records/{id}/override",
      put(records::set_override::<S>).delete(records::clear_override::<S>),
    )
    // Dashboard
    .route("/dashboard", get(dashboard::handler::<S>))
    // People picker search
    .route("/search", get(search::handler::<S>))
    .with_state(store)
}
