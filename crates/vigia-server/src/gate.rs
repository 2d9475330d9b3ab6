//! The RBAC gate — maps routes to required permissions and enforces them.
//!
//! Authentication identifies the user; this middleware resolves their roles
//! from the store once per request and checks the route's module×action
//! requirement. The domain layer below stays permission-unaware.

use axum::{
  extract::{Request, State},
  http::Method,
  middleware::Next,
  response::Response,
};
use vigia_core::{
  rbac::{self, Action, Module},
  store::RecordStore,
};

use crate::{AppState, auth::verify_auth, error::Error};

/// The permission a request must hold, keyed by method and path.
///
/// `None` means the gate imposes nothing beyond authentication — the router
/// will 404/405 unknown routes itself. Clearing an override is an edit, not
/// a delete; only record deletion itself requires the delete grant.
pub fn required_permission(method: &Method, path: &str) -> Option<(Module, Action)> {
  let rest = path.strip_prefix("/api")?;
  let mut segments = rest.trim_matches('/').split('/');
  let head = segments.next().unwrap_or("");
  let tail: Vec<&str> = segments.collect();

  match head {
    "people" => match method.as_str() {
      "GET" => Some((Module::People, Action::View)),
      "POST" => Some((Module::People, Action::Edit)),
      _ => None,
    },
    // The people picker is a read of the directory.
    "search" => match method.as_str() {
      "GET" => Some((Module::People, Action::View)),
      _ => None,
    },
    "requirements" => match method.as_str() {
      "GET" => Some((Module::Requirements, Action::View)),
      "POST" => Some((Module::Requirements, Action::Edit)),
      _ => None,
    },
    "records" => match method.as_str() {
      "GET" => Some((Module::Records, Action::View)),
      "POST" | "PUT" => Some((Module::Records, Action::Edit)),
      "DELETE" if tail.last() == Some(&"override") => {
        Some((Module::Records, Action::Edit))
      }
      "DELETE" => Some((Module::Records, Action::Delete)),
      _ => None,
    },
    "dashboard" => match method.as_str() {
      "GET" => Some((Module::Dashboard, Action::View)),
      _ => None,
    },
    _ => None,
  }
}

/// Middleware: authenticate, resolve the user's permissions, enforce the
/// route requirement, then hand the request to the API router.
pub async fn guard<S>(
  State(state): State<AppState<S>>,
  req: Request,
  next: Next,
) -> Result<Response, Error>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let username = verify_auth(req.headers(), &state.auth)?;

  if let Some((module, action)) = required_permission(req.method(), req.uri().path()) {
    let roles = state
      .store
      .roles_for(&username)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
    let perms = rbac::resolve(&roles);

    if !perms.allows(module, action) {
      tracing::warn!(%username, ?module, ?action, "permission denied");
      return Err(Error::Forbidden { module, action });
    }
  }

  Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn record_reads_need_view() {
    assert_eq!(
      required_permission(&Method::GET, "/api/records"),
      Some((Module::Records, Action::View))
    );
    assert_eq!(
      required_permission(&Method::GET, "/api/records/abc"),
      Some((Module::Records, Action::View))
    );
  }

  #[test]
  fn record_mutations_need_edit() {
    assert_eq!(
      required_permission(&Method::POST, "/api/records"),
      Some((Module::Records, Action::Edit))
    );
    assert_eq!(
      required_permission(&Method::PUT, "/api/records/abc/dates"),
      Some((Module::Records, Action::Edit))
    );
    assert_eq!(
      required_permission(&Method::PUT, "/api/records/abc/override"),
      Some((Module::Records, Action::Edit))
    );
  }

  #[test]
  fn clearing_an_override_is_an_edit_not_a_delete() {
    assert_eq!(
      required_permission(&Method::DELETE, "/api/records/abc/override"),
      Some((Module::Records, Action::Edit))
    );
    assert_eq!(
      required_permission(&Method::DELETE, "/api/records/abc"),
      Some((Module::Records, Action::Delete))
    );
  }

  #[test]
  fn picker_search_is_a_people_read() {
    assert_eq!(
      required_permission(&Method::GET, "/api/search"),
      Some((Module::People, Action::View))
    );
  }

  #[test]
  fn dashboard_is_view_only() {
    assert_eq!(
      required_permission(&Method::GET, "/api/dashboard"),
      Some((Module::Dashboard, Action::View))
    );
    assert_eq!(required_permission(&Method::POST, "/api/dashboard"), None);
  }

  #[test]
  fn unknown_paths_impose_nothing() {
    assert_eq!(required_permission(&Method::GET, "/api/nope"), None);
    assert_eq!(required_permission(&Method::GET, "/healthz"), None);
  }
}
