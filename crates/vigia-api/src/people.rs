//! Handlers for `/people` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/people` | Optional `?kind=employee\|contractor` |
//! | `POST` | `/people` | Body: [`vigia_core::person::NewPerson`] |
//! | `GET`  | `/people/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use vigia_core::{
  person::{NewPerson, Person, PersonKind},
  store::RecordStore,
};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub kind: Option<PersonKind>,
}

/// `GET /people[?kind=<kind>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let people = store
    .list_people(params.kind)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(people))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /people` — body: `{"kind":"employee","full_name":"…","email":null}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.full_name.trim().is_empty() {
    return Err(ApiError::BadRequest("full_name must not be empty".into()));
  }
  let person = store.add_person(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /people/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let person = store
    .get_person(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}
