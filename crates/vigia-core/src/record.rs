//! Accreditation records — the link between a person and a requirement,
//! carrying vigency dates.
//!
//! A record stores only its dates and an optional administrator override.
//! Its lifecycle state is never persisted; it is recomputed on every read by
//! [`crate::lifecycle::classify`], so displayed state cannot drift from what
//! the dates say today.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lifecycle::LifecycleState;

/// A person × requirement link with vigency dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccreditationRecord {
  pub record_id:      Uuid,
  pub person_id:      Uuid,
  pub requirement_id: Uuid,
  /// Date the requirement was granted. Informational only; the classifier
  /// reads `expires_on` alone.
  pub valid_from:     Option<NaiveDate>,
  /// Date the requirement lapses. Absent means the record never expires.
  pub expires_on:     Option<NaiveDate>,
  /// Administrator override. While set, it supersedes the computed state
  /// until explicitly cleared.
  pub manual_state:   Option<LifecycleState>,
  /// Opaque external reference (certificate scan, drive link). Never
  /// interpreted.
  pub document_link:  Option<String>,
  pub created_at:     DateTime<Utc>,
  /// Bumped by the store on every mutation.
  pub updated_at:     DateTime<Utc>,
}

/// Input to [`crate::store::RecordStore::add_record`].
/// Ids and timestamps are always set by the store. A new record never starts
/// with a manual override; overrides are a separate, gated mutation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRecord {
  pub person_id:      Uuid,
  pub requirement_id: Uuid,
  pub valid_from:     Option<NaiveDate>,
  pub expires_on:     Option<NaiveDate>,
  pub document_link:  Option<String>,
}
