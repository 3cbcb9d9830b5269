//! [`SqliteStore`] — the SQLite implementation of [`VersionStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use mandate_core::{
  diff,
  store::{VersionDraft, VersionStore},
  version::{ChangeSummary, Version, VersionId},
};

use crate::{
  encode::{
    decode_rules, encode_breaches, encode_dt, encode_rules, RawVersion,
  },
  schema::SCHEMA,
  Error, Result,
};

const VERSION_COLUMNS: &str = "ordinal, label, filename, uploaded_at, \
                               rule_count, status, added, removed, modified, \
                               rules_json, score, breaches_json";

/// Map a row selected with [`VERSION_COLUMNS`] into a [`RawVersion`].
fn raw_version(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawVersion> {
  Ok(RawVersion {
    ordinal:       row.get(0)?,
    label:         row.get(1)?,
    filename:      row.get(2)?,
    uploaded_at:   row.get(3)?,
    rule_count:    row.get(4)?,
    status:        row.get(5)?,
    added:         row.get(6)?,
    removed:       row.get(7)?,
    modified:      row.get(8)?,
    rules_json:    row.get(9)?,
    score:         row.get(10)?,
    breaches_json: row.get(11)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A mandate version store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// run on the connection's single worker thread, which is what makes the
/// serialized-commit contract structural rather than advisory.
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
}

// ─── VersionStore impl ───────────────────────────────────────────────────────

impl VersionStore for SqliteStore {
  type Error = Error;

  async fn commit_version(&self, draft: VersionDraft) -> Result<Version> {
    let uploaded_at_str = encode_dt(Utc::now());
    let rules_json      = encode_rules(&draft.rules)?;
    let breaches_json   = encode_breaches(&draft.breaches)?;
    let rule_count      = draft.rules.len() as i64;
    let filename        = draft.filename;
    let score           = draft.score;
    let rules           = draft.rules;

    let raw: RawVersion = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Change summary against the previous current version's rules.
        let previous_rules_json: Option<String> = tx
          .query_row(
            "SELECT rules_json FROM versions WHERE status = 'current'",
            [],
            |row| row.get(0),
          )
          .optional()?;

        let changes = match previous_rules_json {
          Some(json) => {
            let old = decode_rules(&json)
              .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            diff::diff(&old, &rules).summary()
          }
          None => ChangeSummary {
            added:    rules.len(),
            removed:  0,
            modified: 0,
          },
        };

        let ordinal: i64 = tx.query_row(
          "SELECT COALESCE(MAX(ordinal), 0) + 1 FROM versions",
          [],
          |row| row.get(0),
        )?;
        let label = Version::label_for(VersionId(ordinal as u64));

        tx.execute(
          "UPDATE versions SET status = 'archived' WHERE status = 'current'",
          [],
        )?;
        tx.execute(
          &format!(
            "INSERT INTO versions ({VERSION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, 'current', ?6, ?7, ?8, ?9, ?10, ?11)"
          ),
          rusqlite::params![
            ordinal,
            label,
            filename,
            uploaded_at_str,
            rule_count,
            changes.added as i64,
            changes.removed as i64,
            changes.modified as i64,
            rules_json,
            score,
            breaches_json,
          ],
        )?;

        let raw = tx.query_row(
          &format!("SELECT {VERSION_COLUMNS} FROM versions WHERE ordinal = ?1"),
          rusqlite::params![ordinal],
          raw_version,
        )?;

        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_version()
  }

  async fn get_version(&self, id: VersionId) -> Result<Option<Version>> {
    let ordinal = id.0 as i64;

    let raw: Option<RawVersion> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {VERSION_COLUMNS} FROM versions WHERE ordinal = ?1"
              ),
              rusqlite::params![ordinal],
              raw_version,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVersion::into_version).transpose()
  }

  async fn list_versions(&self) -> Result<Vec<Version>> {
    let raws: Vec<RawVersion> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {VERSION_COLUMNS} FROM versions ORDER BY ordinal ASC"
        ))?;
        let rows = stmt
          .query_map([], raw_version)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVersion::into_version).collect()
  }

  async fn current(&self) -> Result<Option<Version>> {
    let raw: Option<RawVersion> = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {VERSION_COLUMNS} FROM versions \
                 WHERE status = 'current'"
              ),
              [],
              raw_version,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVersion::into_version).transpose()
  }
}
