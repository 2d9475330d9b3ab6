//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as `YYYY-MM-DD`,
//! role grants as compact JSON. UUIDs are stored as hyphenated lowercase
//! strings.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;
use vigia_core::{
  lifecycle::{LifecycleState, parse_vigency_date},
  person::{Person, PersonKind},
  rbac::{Grant, Role},
  record::AccreditationRecord,
  requirement::Requirement,
};

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

// ─── PersonKind ───────────────────────────────────────────────────────────────

pub fn encode_person_kind(k: PersonKind) -> &'static str {
  match k {
    PersonKind::Employee => "employee",
    PersonKind::Contractor => "contractor",
  }
}

pub fn decode_person_kind(s: &str) -> Result<PersonKind> {
  match s {
    "employee" => Ok(PersonKind::Employee),
    "contractor" => Ok(PersonKind::Contractor),
    other => Err(Error::DateParse(format!("unknown person kind: {other:?}"))),
  }
}

// ─── LifecycleState ───────────────────────────────────────────────────────────

pub fn encode_state(s: LifecycleState) -> &'static str {
  match s {
    LifecycleState::Current => "current",
    LifecycleState::Expiring => "expiring",
    LifecycleState::Expired => "expired",
    LifecycleState::InRenewal => "in_renewal",
  }
}

pub fn decode_state(s: &str) -> Result<LifecycleState> {
  match s {
    "current" => Ok(LifecycleState::Current),
    "expiring" => Ok(LifecycleState::Expiring),
    "expired" => Ok(LifecycleState::Expired),
    "in_renewal" => Ok(LifecycleState::InRenewal),
    other => Err(Error::DateParse(format!("unknown lifecycle state: {other:?}"))),
  }
}

// ─── Role grants ──────────────────────────────────────────────────────────────

pub fn encode_grants(grants: &[Grant]) -> Result<String> {
  Ok(serde_json::to_string(grants)?)
}

pub fn decode_grants(s: &str) -> Result<Vec<Grant>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ────────────────────────────────────────────────────────────────

/// Raw strings read directly from a `people` row.
pub struct RawPerson {
  pub person_id:  String,
  pub created_at: String,
  pub kind:       String,
  pub full_name:  String,
  pub email:      Option<String>,
  pub active:     bool,
}

impl RawPerson {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:  decode_uuid(&self.person_id)?,
      created_at: decode_dt(&self.created_at)?,
      kind:       decode_person_kind(&self.kind)?,
      full_name:  self.full_name,
      email:      self.email,
      active:     self.active,
    })
  }
}

/// Raw strings read directly from a `requirements` row.
pub struct RawRequirement {
  pub requirement_id: String,
  pub created_at:     String,
  pub name:           String,
  pub description:    Option<String>,
}

impl RawRequirement {
  pub fn into_requirement(self) -> Result<Requirement> {
    Ok(Requirement {
      requirement_id: decode_uuid(&self.requirement_id)?,
      created_at:     decode_dt(&self.created_at)?,
      name:           self.name,
      description:    self.description,
    })
  }
}

/// Raw strings read directly from a `records` row.
pub struct RawRecord {
  pub record_id:      String,
  pub person_id:      String,
  pub requirement_id: String,
  pub valid_from:     Option<String>,
  pub expires_on:     Option<String>,
  pub manual_state:   Option<String>,
  pub document_link:  Option<String>,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawRecord {
  pub fn into_record(self) -> Result<AccreditationRecord> {
    Ok(AccreditationRecord {
      record_id:      decode_uuid(&self.record_id)?,
      person_id:      decode_uuid(&self.person_id)?,
      requirement_id: decode_uuid(&self.requirement_id)?,
      // Vigency dates are tolerated rather than validated on the way out:
      // a value we cannot read classifies as "no expiration pressure"
      // instead of poisoning every list the row appears in.
      valid_from:     self.valid_from.as_deref().and_then(parse_vigency_date),
      expires_on:     self.expires_on.as_deref().and_then(parse_vigency_date),
      manual_state:   self.manual_state.as_deref().map(decode_state).transpose()?,
      document_link:  self.document_link,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `roles` row.
pub struct RawRole {
  pub name:   String,
  pub grants: String,
}

impl RawRole {
  pub fn into_role(self) -> Result<Role> {
    Ok(Role {
      name:   self.name,
      grants: decode_grants(&self.grants)?,
    })
  }
}
