//! Version types — committed snapshots of a rule set.
//!
//! Versions are append-only: created only by a successful commit, never
//! deleted, only demoted from `Current` to `Archived` when a newer version
//! is committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{breach::Breach, rule::Rule, Error, Result};

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Monotonically increasing version ordinal, assigned by the store at commit.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct VersionId(pub u64);

impl std::fmt::Display for VersionId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "v{}", self.0)
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle status of a version. Exactly one version holds `Current` once a
/// commit has occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
  Current,
  Archived,
}

impl VersionStatus {
  /// Parse a status name, case-insensitively.
  pub fn parse(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "current" => Ok(Self::Current),
      "archived" => Ok(Self::Archived),
      _ => Err(Error::UnknownVersionStatus(s.to_string())),
    }
  }

  /// The lowercase name used in serialized form and the status column.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Current => "current",
      Self::Archived => "archived",
    }
  }

  pub fn is_current(&self) -> bool { matches!(self, Self::Current) }
}

// ─── Change summary ──────────────────────────────────────────────────────────

/// Rule-count deltas relative to the immediately preceding current version,
/// computed by the diff engine at commit time and then frozen.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct ChangeSummary {
  pub added:    usize,
  pub removed:  usize,
  pub modified: usize,
}

// ─── Version ─────────────────────────────────────────────────────────────────

/// An immutable, committed snapshot of a rule set plus its validation
/// results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
  pub version_id:  VersionId,
  /// Human label in the "Version N.0" format.
  pub label:       String,
  /// Source document filename; `None` for rule sets born from freeform
  /// queries.
  pub filename:    Option<String>,
  /// Store-assigned commit timestamp.
  pub uploaded_at: DateTime<Utc>,
  /// Denormalised `rules.len()`, so list views need not parse the rule list.
  pub rule_count:  usize,
  pub status:      VersionStatus,
  pub changes:     ChangeSummary,
  pub rules:       Vec<Rule>,
  /// Compliance score in [0, 100] if validation ran before commit.
  pub score:       Option<u8>,
  pub breaches:    Vec<Breach>,
}

impl Version {
  /// The human label assigned to the version with this ordinal.
  pub fn label_for(id: VersionId) -> String { format!("Version {}.0", id.0) }
}
