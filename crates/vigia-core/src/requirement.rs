//! Requirement — a catalog entry describing something a person can be
//! accredited for (a certification, an induction, a medical check, …).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A trackable requirement from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Requirement {
  pub requirement_id: Uuid,
  pub created_at:     DateTime<Utc>,
  pub name:           String,
  pub description:    Option<String>,
}

/// Input to [`crate::store::RecordStore::add_requirement`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewRequirement {
  pub name:        String,
  pub description: Option<String>,
}
