//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use vigia_core::{
  lifecycle::LifecycleState,
  person::{NewPerson, Person, PersonKind},
  rbac::Role,
  record::{AccreditationRecord, NewRecord},
  requirement::{NewRequirement, Requirement},
  store::{PersonQuery, RecordQuery, RecordStore},
};

use crate::{
  encode::{
    encode_date, encode_dt, encode_grants, encode_person_kind, encode_state,
    encode_uuid, RawPerson, RawRecord, RawRequirement, RawRole,
  },
  schema::SCHEMA,
  Error, Result,
};

const RECORD_COLUMNS: &str = "record_id, person_id, requirement_id, \
   valid_from, expires_on, manual_state, document_link, created_at, updated_at";

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecord> {
  Ok(RawRecord {
    record_id:      row.get(0)?,
    person_id:      row.get(1)?,
    requirement_id: row.get(2)?,
    valid_from:     row.get(3)?,
    expires_on:     row.get(4)?,
    manual_state:   row.get(5)?,
    document_link:  row.get(6)?,
    created_at:     row.get(7)?,
    updated_at:     row.get(8)?,
  })
}

fn person_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPerson> {
  Ok(RawPerson {
    person_id:  row.get(0)?,
    created_at: row.get(1)?,
    kind:       row.get(2)?,
    full_name:  row.get(3)?,
    email:      row.get(4)?,
    active:     row.get(5)?,
  })
}

// ─── Store ────────────────────────────────────────────────────────────────────

/// A Vigia record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch a record row by id, without existence checks.
  async fn fetch_record(&self, id: Uuid) -> Result<Option<AccreditationRecord>> {
    let id_str = encode_uuid(id);
    let sql = format!("SELECT {RECORD_COLUMNS} FROM records WHERE record_id = ?1");

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], record_from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  /// Run arbitrary SQL against the underlying connection. Lets tests plant
  /// row states the public API refuses to produce.
  #[cfg(test)]
  pub(crate) async fn execute_raw(&self, sql: &str) -> Result<()> {
    let sql = sql.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn row_exists(&self, sql: &'static str, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(sql, rusqlite::params![id_str], |_| Ok(true))
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }
}

// ─── RecordStore impl ─────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── People ────────────────────────────────────────────────────────────────

  async fn add_person(&self, input: NewPerson) -> Result<Person> {
    let person = Person {
      person_id:  Uuid::new_v4(),
      created_at: Utc::now(),
      kind:       input.kind,
      full_name:  input.full_name,
      email:      input.email,
      active:     true,
    };

    let id_str    = encode_uuid(person.person_id);
    let at_str    = encode_dt(person.created_at);
    let kind_str  = encode_person_kind(person.kind).to_owned();
    let full_name = person.full_name.clone();
    let email     = person.email.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO people (person_id, created_at, kind, full_name, email, active)
           VALUES (?1, ?2, ?3, ?4, ?5, 1)",
          rusqlite::params![id_str, at_str, kind_str, full_name, email],
        )?;
        Ok(())
      })
      .await?;

    Ok(person)
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT person_id, created_at, kind, full_name, email, active
               FROM people WHERE person_id = ?1",
              rusqlite::params![id_str],
              person_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn list_people(&self, kind: Option<PersonKind>) -> Result<Vec<Person>> {
    let kind_str = kind.map(encode_person_kind).map(str::to_owned);

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(k) = kind_str {
          let mut stmt = conn.prepare(
            "SELECT person_id, created_at, kind, full_name, email, active
             FROM people WHERE kind = ?1 ORDER BY full_name",
          )?;
          stmt
            .query_map(rusqlite::params![k], person_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT person_id, created_at, kind, full_name, email, active
             FROM people ORDER BY full_name",
          )?;
          stmt
            .query_map([], person_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn find_people(&self, query: &PersonQuery) -> Result<Vec<Person>> {
    let text_pattern     = query.text.as_deref().map(|t| format!("%{t}%"));
    let kind_str         = query.kind.map(encode_person_kind).map(str::to_owned);
    let include_inactive = query.include_inactive;
    let limit_val        = query.limit.unwrap_or(100) as i64;
    let offset_val       = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically; parameter positions stay fixed.
        let mut conds: Vec<&'static str> = vec![];
        if text_pattern.is_some() {
          conds.push("(full_name LIKE ?1 OR email LIKE ?1)");
        }
        if kind_str.is_some() {
          conds.push("kind = ?2");
        }
        if !include_inactive {
          conds.push("active = 1");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT person_id, created_at, kind, full_name, email, active
           FROM people
           {where_clause}
           ORDER BY full_name
           LIMIT ?3 OFFSET ?4"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              text_pattern.as_deref(),
              kind_str.as_deref(),
              limit_val,
              offset_val,
            ],
            person_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  // ── Requirements ──────────────────────────────────────────────────────────

  async fn add_requirement(&self, input: NewRequirement) -> Result<Requirement> {
    let requirement = Requirement {
      requirement_id: Uuid::new_v4(),
      created_at:     Utc::now(),
      name:           input.name,
      description:    input.description,
    };

    let id_str      = encode_uuid(requirement.requirement_id);
    let at_str      = encode_dt(requirement.created_at);
    let name        = requirement.name.clone();
    let description = requirement.description.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO requirements (requirement_id, created_at, name, description)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, at_str, name, description],
        )?;
        Ok(())
      })
      .await?;

    Ok(requirement)
  }

  async fn get_requirement(&self, id: Uuid) -> Result<Option<Requirement>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawRequirement> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT requirement_id, created_at, name, description
               FROM requirements WHERE requirement_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawRequirement {
                  requirement_id: row.get(0)?,
                  created_at:     row.get(1)?,
                  name:           row.get(2)?,
                  description:    row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRequirement::into_requirement).transpose()
  }

  async fn list_requirements(&self) -> Result<Vec<Requirement>> {
    let raws: Vec<RawRequirement> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT requirement_id, created_at, name, description
           FROM requirements ORDER BY name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawRequirement {
              requirement_id: row.get(0)?,
              created_at:     row.get(1)?,
              name:           row.get(2)?,
              description:    row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawRequirement::into_requirement)
      .collect()
  }

  // ── Records ───────────────────────────────────────────────────────────────

  async fn add_record(&self, input: NewRecord) -> Result<AccreditationRecord> {
    if !self
      .row_exists("SELECT 1 FROM people WHERE person_id = ?1", input.person_id)
      .await?
    {
      return Err(Error::PersonNotFound(input.person_id));
    }
    if !self
      .row_exists(
        "SELECT 1 FROM requirements WHERE requirement_id = ?1",
        input.requirement_id,
      )
      .await?
    {
      return Err(Error::RequirementNotFound(input.requirement_id));
    }

    let person_str      = encode_uuid(input.person_id);
    let requirement_str = encode_uuid(input.requirement_id);
    let duplicate: bool = {
      let (p, r) = (person_str.clone(), requirement_str.clone());
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT 1 FROM records WHERE person_id = ?1 AND requirement_id = ?2",
                rusqlite::params![p, r],
                |_| Ok(true),
              )
              .optional()?
              .unwrap_or(false),
          )
        })
        .await?
    };
    if duplicate {
      return Err(Error::DuplicateRecord {
        person_id:      input.person_id,
        requirement_id: input.requirement_id,
      });
    }

    let now = Utc::now();
    let record = AccreditationRecord {
      record_id:      Uuid::new_v4(),
      person_id:      input.person_id,
      requirement_id: input.requirement_id,
      valid_from:     input.valid_from,
      expires_on:     input.expires_on,
      manual_state:   None,
      document_link:  input.document_link,
      created_at:     now,
      updated_at:     now,
    };

    let id_str     = encode_uuid(record.record_id);
    let from_str   = record.valid_from.map(encode_date);
    let until_str  = record.expires_on.map(encode_date);
    let link       = record.document_link.clone();
    let at_str     = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO records (
             record_id, person_id, requirement_id,
             valid_from, expires_on, manual_state, document_link,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?7, ?7)",
          rusqlite::params![
            id_str,
            person_str,
            requirement_str,
            from_str,
            until_str,
            link,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn get_record(&self, id: Uuid) -> Result<Option<AccreditationRecord>> {
    self.fetch_record(id).await
  }

  async fn list_records(&self, query: &RecordQuery) -> Result<Vec<AccreditationRecord>> {
    let person_str      = query.person_id.map(encode_uuid);
    let requirement_str = query.requirement_id.map(encode_uuid);
    let limit_val       = query.limit.unwrap_or(500) as i64;
    let offset_val      = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut conds: Vec<&'static str> = vec![];
        if person_str.is_some() {
          conds.push("person_id = ?1");
        }
        if requirement_str.is_some() {
          conds.push("requirement_id = ?2");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {RECORD_COLUMNS}
           FROM records
           {where_clause}
           ORDER BY updated_at DESC
           LIMIT ?3 OFFSET ?4"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              person_str.as_deref(),
              requirement_str.as_deref(),
              limit_val,
              offset_val,
            ],
            record_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn update_dates(
    &self,
    record_id: Uuid,
    valid_from: Option<NaiveDate>,
    expires_on: Option<NaiveDate>,
  ) -> Result<AccreditationRecord> {
    let id_str    = encode_uuid(record_id);
    let from_str  = valid_from.map(encode_date);
    let until_str = expires_on.map(encode_date);
    let at_str    = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE records
           SET valid_from = ?2, expires_on = ?3, updated_at = ?4
           WHERE record_id = ?1",
          rusqlite::params![id_str, from_str, until_str, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::RecordNotFound(record_id));
    }
    self
      .fetch_record(record_id)
      .await?
      .ok_or(Error::RecordNotFound(record_id))
  }

  async fn set_manual_state(
    &self,
    record_id: Uuid,
    state: LifecycleState,
  ) -> Result<AccreditationRecord> {
    let id_str    = encode_uuid(record_id);
    let state_str = encode_state(state).to_owned();
    let at_str    = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE records SET manual_state = ?2, updated_at = ?3
           WHERE record_id = ?1",
          rusqlite::params![id_str, state_str, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::RecordNotFound(record_id));
    }
    self
      .fetch_record(record_id)
      .await?
      .ok_or(Error::RecordNotFound(record_id))
  }

  async fn clear_manual_state(&self, record_id: Uuid) -> Result<AccreditationRecord> {
    let existing = self
      .fetch_record(record_id)
      .await?
      .ok_or(Error::RecordNotFound(record_id))?;
    if existing.manual_state.is_none() {
      return Err(Error::NoOverrideSet(record_id));
    }

    let id_str = encode_uuid(record_id);
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE records SET manual_state = NULL, updated_at = ?2
           WHERE record_id = ?1",
          rusqlite::params![id_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    self
      .fetch_record(record_id)
      .await?
      .ok_or(Error::RecordNotFound(record_id))
  }

  async fn delete_record(&self, record_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(record_id);

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM records WHERE record_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::RecordNotFound(record_id));
    }
    Ok(())
  }

  // ── RBAC ──────────────────────────────────────────────────────────────────

  async fn upsert_role(&self, role: Role) -> Result<Role> {
    let name       = role.name.clone();
    let grants_str = encode_grants(&role.grants)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO roles (name, grants) VALUES (?1, ?2)
           ON CONFLICT(name) DO UPDATE SET grants = excluded.grants",
          rusqlite::params![name, grants_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(role)
  }

  async fn get_role(&self, name: &str) -> Result<Option<Role>> {
    let name = name.to_owned();

    let raw: Option<RawRole> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT name, grants FROM roles WHERE name = ?1",
              rusqlite::params![name],
              |row| {
                Ok(RawRole { name: row.get(0)?, grants: row.get(1)? })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRole::into_role).transpose()
  }

  async fn list_roles(&self) -> Result<Vec<Role>> {
    let raws: Vec<RawRole> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT name, grants FROM roles ORDER BY name")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawRole { name: row.get(0)?, grants: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRole::into_role).collect()
  }

  async fn assign_role(&self, username: &str, role_name: &str) -> Result<()> {
    if self.get_role(role_name).await?.is_none() {
      return Err(Error::RoleNotFound(role_name.to_owned()));
    }

    let username  = username.to_owned();
    let role_name = role_name.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO role_assignments (username, role_name)
           VALUES (?1, ?2)",
          rusqlite::params![username, role_name],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn unassign_role(&self, username: &str, role_name: &str) -> Result<()> {
    let username  = username.to_owned();
    let role_name = role_name.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM role_assignments WHERE username = ?1 AND role_name = ?2",
          rusqlite::params![username, role_name],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn roles_for(&self, username: &str) -> Result<Vec<Role>> {
    let username = username.to_owned();

    let raws: Vec<RawRole> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT r.name, r.grants
           FROM roles r
           JOIN role_assignments a ON a.role_name = r.name
           WHERE a.username = ?1
           ORDER BY r.name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![username], |row| {
            Ok(RawRole { name: row.get(0)?, grants: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRole::into_role).collect()
  }
}
