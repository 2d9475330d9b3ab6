//! Handlers for `/requirements` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use uuid::Uuid;
use vigia_core::{
  requirement::{NewRequirement, Requirement},
  store::RecordStore,
};

use crate::error::ApiError;

/// `GET /requirements`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Requirement>>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let requirements = store.list_requirements().await.map_err(ApiError::store)?;
  Ok(Json(requirements))
}

/// `POST /requirements` — body: `{"name":"…","description":null}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewRequirement>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }
  let requirement = store
    .add_requirement(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(requirement)))
}

/// `GET /requirements/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Requirement>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let requirement = store
    .get_requirement(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("requirement {id} not found")))?;
  Ok(Json(requirement))
}
