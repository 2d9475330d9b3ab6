//! Handler for `GET /dashboard` — per-state counts and the records closest
//! to expiry, all classified against a single reference day.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vigia_core::{
  lifecycle::{ClassifiedRecord, LifecycleState},
  store::{RecordQuery, RecordStore},
};

use crate::{error::ApiError, records::reference_day};

/// How many soonest-expiring records the dashboard surfaces.
const EXPIRING_SOON_LIMIT: usize = 10;

#[derive(Debug, Deserialize, Default)]
pub struct Params {
  pub today: Option<NaiveDate>,
}

/// Aggregated standing of every record in the store.
#[derive(Debug, Serialize, Deserialize)]
pub struct Dashboard {
  pub today:         NaiveDate,
  pub total:         usize,
  pub current:       usize,
  pub expiring:      usize,
  pub expired:       usize,
  pub in_renewal:    usize,
  /// Records with an administrator override in effect.
  pub overridden:    usize,
  /// The `Expiring` records sorted by days remaining, soonest first.
  pub expiring_soon: Vec<ClassifiedRecord>,
}

/// `GET /dashboard[?today=…]`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<Params>,
) -> Result<Json<Dashboard>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let today = reference_day(params.today);

  let rows: Vec<ClassifiedRecord> = store
    .list_records(&RecordQuery {
      // The dashboard aggregates everything; lift the default page size.
      limit: Some(i64::MAX as usize),
      ..Default::default()
    })
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|record| ClassifiedRecord::new(record, today))
    .collect();

  let count = |state: LifecycleState| {
    rows
      .iter()
      .filter(|r| r.classification.state == state)
      .count()
  };

  let mut expiring_soon: Vec<ClassifiedRecord> = rows
    .iter()
    .filter(|r| r.classification.state == LifecycleState::Expiring)
    .cloned()
    .collect();
  expiring_soon.sort_by_key(|r| r.classification.days_until);
  expiring_soon.truncate(EXPIRING_SOON_LIMIT);

  let dashboard = Dashboard {
    today,
    total: rows.len(),
    current: count(LifecycleState::Current),
    expiring: count(LifecycleState::Expiring),
    expired: count(LifecycleState::Expired),
    in_renewal: count(LifecycleState::InRenewal),
    overridden: rows.iter().filter(|r| r.classification.overridden).count(),
    expiring_soon,
  };

  Ok(Json(dashboard))
}
