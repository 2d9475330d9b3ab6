//! Handler for `GET /search` — the people picker.
//!
//! Query params map directly to [`PersonQuery`] fields.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use vigia_core::{
  person::{Person, PersonKind},
  store::{PersonQuery, RecordStore},
};

use crate::error::ApiError;

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  /// Case-insensitive substring over name and email.
  pub text:             Option<String>,
  pub kind:             Option<PersonKind>,
  /// Pickers show active people only unless asked otherwise.
  #[serde(default)]
  pub include_inactive: bool,
  pub limit:            Option<usize>,
  pub offset:           Option<usize>,
}

/// `GET /search[?text=…][&kind=…][&include_inactive=true][&limit=…][&offset=…]`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let query = PersonQuery {
    text:             params.text,
    kind:             params.kind,
    include_inactive: params.include_inactive,
    limit:            params.limit,
    offset:           params.offset,
  };

  let people = store.find_people(&query).await.map_err(ApiError::store)?;
  Ok(Json(people))
}
