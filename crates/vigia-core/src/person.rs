//! Person — the subject an accreditation record concerns.
//!
//! A person holds only directory metadata. Which accreditations they carry,
//! and how close those are to expiry, lives in their records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Employment relationship of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonKind {
  Employee,
  Contractor,
}

/// A directory entry that accreditation records point at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub person_id:  Uuid,
  pub created_at: DateTime<Utc>,
  pub kind:       PersonKind,
  pub full_name:  String,
  pub email:      Option<String>,
  /// Inactive people keep their records but drop out of pickers by default.
  pub active:     bool,
}

/// Input to [`crate::store::RecordStore::add_person`].
/// `person_id` and `created_at` are always set by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPerson {
  pub kind:      PersonKind,
  pub full_name: String,
  pub email:     Option<String>,
}
