//! Handlers for `/records` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/records` | Optional `person_id`, `requirement_id`, `state`, `today`, `limit`, `offset` |
//! | `GET`    | `/records/:id` | Single classified record |
//! | `POST`   | `/records` | Body: [`vigia_core::record::NewRecord`]; returns 201 |
//! | `PUT`    | `/records/:id/dates` | Body: [`UpdateDatesBody`] |
//! | `PUT`    | `/records/:id/override` | Body: `{"state":"in_renewal"}` |
//! | `DELETE` | `/records/:id/override` | Clears the manual override |
//! | `DELETE` | `/records/:id` | Deletes the record (privileged) |
//!
//! Every read returns [`ClassifiedRecord`]s. The reference day is captured
//! once per request — all rows in one response are classified against the
//! same day, even if handling straddles midnight — and can be pinned with
//! the `today` query parameter for deterministic clients and tests.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use uuid::Uuid;
use vigia_core::{
  lifecycle::{ClassifiedRecord, LifecycleState},
  record::NewRecord,
  store::{RecordQuery, RecordStore},
};

use crate::error::ApiError;

/// The reference day for a request: an explicit `today` parameter, or the
/// server's local calendar day captured now.
pub(crate) fn reference_day(param: Option<NaiveDate>) -> NaiveDate {
  param.unwrap_or_else(|| Local::now().date_naive())
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub person_id:      Option<Uuid>,
  pub requirement_id: Option<Uuid>,
  /// Filter on the *effective* state (override included).
  pub state:          Option<LifecycleState>,
  /// Reference day; defaults to the server's local day.
  pub today:          Option<NaiveDate>,
  pub limit:          Option<usize>,
  pub offset:         Option<usize>,
}

/// `GET /records[?person_id=…][&requirement_id=…][&state=…][&today=…]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ClassifiedRecord>>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let today = reference_day(params.today);
  let query = RecordQuery {
    person_id:      params.person_id,
    requirement_id: params.requirement_id,
    limit:          params.limit,
    offset:         params.offset,
  };

  let mut rows: Vec<ClassifiedRecord> = store
    .list_records(&query)
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|record| ClassifiedRecord::new(record, today))
    .collect();

  if let Some(state) = params.state {
    rows.retain(|row| row.classification.state == state);
  }

  Ok(Json(rows))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct TodayParam {
  pub today: Option<NaiveDate>,
}

/// `GET /records/:id[?today=…]`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<TodayParam>,
) -> Result<Json<ClassifiedRecord>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let record = store
    .get_record(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("record {id} not found")))?;
  Ok(Json(ClassifiedRecord::new(record, reference_day(params.today))))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /records` — returns 201 + the stored record, classified.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<TodayParam>,
  Json(body): Json<NewRecord>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  // Surface the useful failure modes as typed statuses before the store's
  // own constraints fire.
  if store
    .get_person(body.person_id)
    .await
    .map_err(ApiError::store)?
    .is_none()
  {
    return Err(ApiError::BadRequest(format!(
      "person {} not found",
      body.person_id
    )));
  }
  if store
    .get_requirement(body.requirement_id)
    .await
    .map_err(ApiError::store)?
    .is_none()
  {
    return Err(ApiError::BadRequest(format!(
      "requirement {} not found",
      body.requirement_id
    )));
  }

  let existing = store
    .list_records(&RecordQuery {
      person_id:      Some(body.person_id),
      requirement_id: Some(body.requirement_id),
      ..Default::default()
    })
    .await
    .map_err(ApiError::store)?;
  if !existing.is_empty() {
    return Err(ApiError::Conflict(format!(
      "person {} already has a record for requirement {}",
      body.person_id, body.requirement_id
    )));
  }

  let record = store.add_record(body).await.map_err(ApiError::store)?;
  let classified = ClassifiedRecord::new(record, reference_day(params.today));
  Ok((StatusCode::CREATED, Json(classified)))
}

// ─── Update dates ─────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /records/:id/dates`. Both fields are replaced
/// as given; omitting one clears the date.
#[derive(Debug, Deserialize)]
pub struct UpdateDatesBody {
  pub valid_from: Option<NaiveDate>,
  pub expires_on: Option<NaiveDate>,
}

/// `PUT /records/:id/dates`
pub async fn update_dates<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<TodayParam>,
  Json(body): Json<UpdateDatesBody>,
) -> Result<Json<ClassifiedRecord>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  ensure_record_exists(store.as_ref(), id).await?;
  let record = store
    .update_dates(id, body.valid_from, body.expires_on)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ClassifiedRecord::new(record, reference_day(params.today))))
}

// ─── Manual override ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OverrideBody {
  pub state: LifecycleState,
}

/// `PUT /records/:id/override` — body: `{"state":"in_renewal"}`.
///
/// While set, the override supersedes the date-computed state on every read.
/// The response still carries the date-derived countdown message so clients
/// can show both, tagged as manually modified.
pub async fn set_override<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<TodayParam>,
  Json(body): Json<OverrideBody>,
) -> Result<Json<ClassifiedRecord>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  ensure_record_exists(store.as_ref(), id).await?;
  let record = store
    .set_manual_state(id, body.state)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ClassifiedRecord::new(record, reference_day(params.today))))
}

/// `DELETE /records/:id/override` — classification falls back to the dates.
pub async fn clear_override<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<TodayParam>,
) -> Result<Json<ClassifiedRecord>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let record = store
    .get_record(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("record {id} not found")))?;
  if record.manual_state.is_none() {
    return Err(ApiError::BadRequest(format!(
      "record {id} has no manual state to clear"
    )));
  }

  let record = store
    .clear_manual_state(id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ClassifiedRecord::new(record, reference_day(params.today))))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /records/:id` — 204 on success. Gated as a privileged action by
/// the server in front of this router.
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  ensure_record_exists(store.as_ref(), id).await?;
  store.delete_record(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

async fn ensure_record_exists<S>(store: &S, id: Uuid) -> Result<(), ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .get_record(id)
    .await
    .map_err(ApiError::store)?
    .map(|_| ())
    .ok_or_else(|| ApiError::NotFound(format!("record {id} not found")))
}
