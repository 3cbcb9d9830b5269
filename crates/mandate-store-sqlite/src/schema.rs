//! SQL schema for the mandate SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Versions are append-only. The only UPDATE ever issued against this table
-- is the demotion of the previous current row during a commit.
CREATE TABLE IF NOT EXISTS versions (
    ordinal       INTEGER PRIMARY KEY,  -- monotonic; doubles as insertion order
    label         TEXT NOT NULL,        -- 'Version N.0'
    filename      TEXT,                 -- NULL for freeform-born rule sets
    uploaded_at   TEXT NOT NULL,        -- ISO 8601 UTC; store-assigned
    rule_count    INTEGER NOT NULL,
    status        TEXT NOT NULL,        -- 'current' | 'archived'
    added         INTEGER NOT NULL,
    removed       INTEGER NOT NULL,
    modified      INTEGER NOT NULL,
    rules_json    TEXT NOT NULL DEFAULT '[]',
    score         INTEGER,              -- NULL when validation was skipped
    breaches_json TEXT NOT NULL DEFAULT '[]'
);

-- At most one row may hold 'current', including across restarts.
CREATE UNIQUE INDEX IF NOT EXISTS versions_current_idx
    ON versions(status) WHERE status = 'current';

PRAGMA user_version = 1;
";
