//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, rule and breach lists as
//! compact JSON, and the version status as its lowercase name.

use chrono::{DateTime, Utc};
use mandate_core::{
  breach::Breach,
  rule::Rule,
  version::{ChangeSummary, Version, VersionId, VersionStatus},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_rules(rules: &[Rule]) -> Result<String> {
  Ok(serde_json::to_string(rules)?)
}

pub fn decode_rules(s: &str) -> Result<Vec<Rule>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_breaches(breaches: &[Breach]) -> Result<String> {
  Ok(serde_json::to_string(breaches)?)
}

pub fn decode_breaches(s: &str) -> Result<Vec<Breach>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw values read directly from a `versions` row.
pub struct RawVersion {
  pub ordinal:       i64,
  pub label:         String,
  pub filename:      Option<String>,
  pub uploaded_at:   String,
  pub rule_count:    i64,
  pub status:        String,
  pub added:         i64,
  pub removed:       i64,
  pub modified:      i64,
  pub rules_json:    String,
  pub score:         Option<i64>,
  pub breaches_json: String,
}

impl RawVersion {
  pub fn into_version(self) -> Result<Version> {
    let status = VersionStatus::parse(&self.status)?;

    Ok(Version {
      version_id:  VersionId(self.ordinal as u64),
      label:       self.label,
      filename:    self.filename,
      uploaded_at: decode_dt(&self.uploaded_at)?,
      rule_count:  self.rule_count as usize,
      status,
      changes:     ChangeSummary {
        added:    self.added as usize,
        removed:  self.removed as usize,
        modified: self.modified as usize,
      },
      rules:       decode_rules(&self.rules_json)?,
      score:       self.score.map(|s| s.clamp(0, 100) as u8),
      breaches:    decode_breaches(&self.breaches_json)?,
    })
  }
}
