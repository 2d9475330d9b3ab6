//! HTTP deployment of the Vigia API.
//!
//! Wraps [`vigia_api::api_router`] with HTTP Basic authentication and the
//! RBAC gate: every request is authenticated against the configured users,
//! the user's roles are resolved from the store, and the route's required
//! module×action permission is checked before the handler runs.

pub mod auth;
pub mod error;
pub mod gate;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use vigia_core::store::RecordStore;

use auth::AuthConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// One account allowed to authenticate against this server instance.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub users:      Vec<UserConfig>,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the gate middleware.
#[derive(Clone)]
pub struct AppState<S: RecordStore> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the gated router: `/api/*` behind basic auth + RBAC.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .nest("/api", vigia_api::api_router(state.store.clone()))
    .layer(middleware::from_fn_with_state(state, gate::guard::<S>))
    .layer(TraceLayer::new_for_http())
}
