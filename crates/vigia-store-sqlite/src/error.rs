//! Error type for `vigia-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] vigia_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("person not found: {0}")]
  PersonNotFound(Uuid),

  #[error("requirement not found: {0}")]
  RequirementNotFound(Uuid),

  #[error("record not found: {0}")]
  RecordNotFound(Uuid),

  /// The person × requirement pair already has a record.
  #[error("person {person_id} already has a record for requirement {requirement_id}")]
  DuplicateRecord {
    person_id:      Uuid,
    requirement_id: Uuid,
  },

  #[error("record {0} has no manual state to clear")]
  NoOverrideSet(Uuid),

  #[error("role not found: {0:?}")]
  RoleNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
