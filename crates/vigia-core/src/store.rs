//! The `RecordStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `vigia-store-sqlite`).
//! Higher layers (`vigia-api`, `vigia-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  lifecycle::LifecycleState,
  person::{NewPerson, Person, PersonKind},
  rbac::Role,
  record::{AccreditationRecord, NewRecord},
  requirement::{NewRequirement, Requirement},
};

// ─── Query types ──────────────────────────────────────────────────────────────

/// Parameters for [`RecordStore::find_people`] — backs the searchable
/// person picker.
#[derive(Debug, Clone, Default)]
pub struct PersonQuery {
  /// Case-insensitive substring over name and email.
  pub text:             Option<String>,
  pub kind:             Option<PersonKind>,
  /// Include inactive people. Default: pickers show active only.
  pub include_inactive: bool,
  pub limit:            Option<usize>,
  pub offset:           Option<usize>,
}

/// Parameters for [`RecordStore::list_records`].
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
  pub person_id:      Option<Uuid>,
  pub requirement_id: Option<Uuid>,
  pub limit:          Option<usize>,
  pub offset:         Option<usize>,
}

// ─── Trait ────────────────────────────────────────────────────────────────────

/// Abstraction over a Vigia storage backend.
///
/// The store persists dates and the manual override only; lifecycle state is
/// always recomputed on read by [`crate::lifecycle::classify`], so there is
/// no cached state to drift. Authorization is entirely the caller's concern.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── People ────────────────────────────────────────────────────────────

  /// Create and persist a new person.
  fn add_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Retrieve a person by UUID. Returns `None` if not found.
  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// List all people, optionally filtered by kind. Includes inactive.
  fn list_people(
    &self,
    kind: Option<PersonKind>,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Search people for the picker widget.
  fn find_people<'a>(
    &'a self,
    query: &'a PersonQuery,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  // ── Requirements ──────────────────────────────────────────────────────

  fn add_requirement(
    &self,
    input: NewRequirement,
  ) -> impl Future<Output = Result<Requirement, Self::Error>> + Send + '_;

  fn get_requirement(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Requirement>, Self::Error>> + Send + '_;

  fn list_requirements(
    &self,
  ) -> impl Future<Output = Result<Vec<Requirement>, Self::Error>> + Send + '_;

  // ── Records ───────────────────────────────────────────────────────────

  /// Link a person to a requirement with vigency dates.
  ///
  /// Returns an error if either side is missing or the pair already has a
  /// record (one record per person × requirement).
  fn add_record(
    &self,
    input: NewRecord,
  ) -> impl Future<Output = Result<AccreditationRecord, Self::Error>> + Send + '_;

  /// Retrieve a record by UUID. Returns `None` if not found.
  fn get_record(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<AccreditationRecord>, Self::Error>> + Send + '_;

  /// List records matching `query`, most recently updated first.
  fn list_records<'a>(
    &'a self,
    query: &'a RecordQuery,
  ) -> impl Future<Output = Result<Vec<AccreditationRecord>, Self::Error>> + Send + 'a;

  /// Correct a record's vigency dates. Both fields are replaced as given;
  /// passing `None` clears a date.
  fn update_dates(
    &self,
    record_id: Uuid,
    valid_from: Option<NaiveDate>,
    expires_on: Option<NaiveDate>,
  ) -> impl Future<Output = Result<AccreditationRecord, Self::Error>> + Send + '_;

  /// Set the administrator override. While present it supersedes the
  /// date-computed state on every read.
  fn set_manual_state(
    &self,
    record_id: Uuid,
    state: LifecycleState,
  ) -> impl Future<Output = Result<AccreditationRecord, Self::Error>> + Send + '_;

  /// Clear the override so classification falls back to the dates.
  /// Returns an error if no override is set.
  fn clear_manual_state(
    &self,
    record_id: Uuid,
  ) -> impl Future<Output = Result<AccreditationRecord, Self::Error>> + Send + '_;

  /// Delete a record outright. Privileged; gated by the caller, never by
  /// the classifier.
  fn delete_record(
    &self,
    record_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── RBAC ──────────────────────────────────────────────────────────────

  /// Create a role or replace its grants if the name already exists.
  fn upsert_role(
    &self,
    role: Role,
  ) -> impl Future<Output = Result<Role, Self::Error>> + Send + '_;

  fn get_role<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Role>, Self::Error>> + Send + 'a;

  fn list_roles(
    &self,
  ) -> impl Future<Output = Result<Vec<Role>, Self::Error>> + Send + '_;

  /// Grant `role_name` to `username`. Idempotent.
  fn assign_role<'a>(
    &'a self,
    username: &'a str,
    role_name: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Revoke `role_name` from `username`. Idempotent.
  fn unassign_role<'a>(
    &'a self,
    username: &'a str,
    role_name: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// All roles currently granted to `username`.
  fn roles_for<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Vec<Role>, Self::Error>> + Send + 'a;
}
