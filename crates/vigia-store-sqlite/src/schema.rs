//! SQL schema for the Vigia SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS people (
    person_id  TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    kind       TEXT NOT NULL,   -- 'employee' | 'contractor'
    full_name  TEXT NOT NULL,
    email      TEXT,
    active     INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS requirements (
    requirement_id TEXT PRIMARY KEY,
    created_at     TEXT NOT NULL,
    name           TEXT NOT NULL,
    description    TEXT
);

-- Only dates and the manual override are persisted. Lifecycle state is
-- recomputed on every read; there is no cached-state column to go stale.
CREATE TABLE IF NOT EXISTS records (
    record_id      TEXT PRIMARY KEY,
    person_id      TEXT NOT NULL REFERENCES people(person_id),
    requirement_id TEXT NOT NULL REFERENCES requirements(requirement_id),
    valid_from     TEXT,            -- YYYY-MM-DD or NULL
    expires_on     TEXT,            -- YYYY-MM-DD or NULL
    manual_state   TEXT,            -- lifecycle state discriminant or NULL
    document_link  TEXT,
    created_at     TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    updated_at     TEXT NOT NULL,
    UNIQUE (person_id, requirement_id)
);

CREATE TABLE IF NOT EXISTS roles (
    name   TEXT PRIMARY KEY,
    grants TEXT NOT NULL            -- JSON array of {module, action}
);

CREATE TABLE IF NOT EXISTS role_assignments (
    username  TEXT NOT NULL,
    role_name TEXT NOT NULL REFERENCES roles(name),
    UNIQUE (username, role_name)
);

CREATE INDEX IF NOT EXISTS records_person_idx      ON records(person_id);
CREATE INDEX IF NOT EXISTS records_requirement_idx ON records(requirement_id);
CREATE INDEX IF NOT EXISTS records_expires_idx     ON records(expires_on);
CREATE INDEX IF NOT EXISTS assignments_user_idx    ON role_assignments(username);

PRAGMA user_version = 1;
";
