//! Error types for `vigia-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("person not found: {0}")]
  PersonNotFound(Uuid),

  #[error("requirement not found: {0}")]
  RequirementNotFound(Uuid),

  #[error("record not found: {0}")]
  RecordNotFound(Uuid),

  #[error("person {person_id} already has a record for requirement {requirement_id}")]
  DuplicateRecord {
    person_id:      Uuid,
    requirement_id: Uuid,
  },

  #[error("record {0} has no manual state to clear")]
  NoOverrideSet(Uuid),

  #[error("role not found: {0:?}")]
  RoleNotFound(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
