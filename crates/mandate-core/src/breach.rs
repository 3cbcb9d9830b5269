//! Breach types — detected violations of rules against portfolio holdings.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Severity ────────────────────────────────────────────────────────────────

/// How serious a detected violation is.
/// Declaration order gives the derived `Ord` High > Medium > Low.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Low,
  Medium,
  High,
}

impl Severity {
  /// Parse a severity name, case-insensitively.
  pub fn parse(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "low" => Ok(Self::Low),
      "medium" => Ok(Self::Medium),
      "high" => Ok(Self::High),
      _ => Err(Error::UnknownSeverity(s.to_string())),
    }
  }

  /// The lowercase name used in serialized form.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Low => "low",
      Self::Medium => "medium",
      Self::High => "high",
    }
  }
}

// ─── Breach ──────────────────────────────────────────────────────────────────

/// A detected violation of a compliance rule by a fund.
///
/// Breaches reference the rule by display name, not identifier — the agent
/// does not reliably echo identifiers back. They are immutable snapshots of
/// the validation run that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breach {
  pub fund:        String,
  /// Display name of the violated rule (not a foreign key).
  pub rule:        String,
  /// Observed value at validation time, e.g. "12.4%".
  pub observed:    String,
  pub limit:       String,
  pub severity:    Severity,
  pub remediation: Option<String>,
}
