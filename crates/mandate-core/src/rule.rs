//! Rule types — the unit of content extracted from a guideline document.
//!
//! A rule is immutable once committed into a version. Identity is the rule
//! identifier; display name, threshold, and provenance are payload.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Category ────────────────────────────────────────────────────────────────

/// The kind of constraint a rule expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
  /// A numeric ceiling or floor, e.g. "single issuer ≤ 10% of NAV".
  Limit,
  /// A prohibition, e.g. "no direct commodity exposure".
  Restriction,
  /// An obligation that must hold, e.g. "≥ 90% investment grade".
  Requirement,
}

impl RuleCategory {
  /// Parse a category name, case-insensitively.
  pub fn parse(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "limit" => Ok(Self::Limit),
      "restriction" => Ok(Self::Restriction),
      "requirement" => Ok(Self::Requirement),
      _ => Err(Error::UnknownCategory(s.to_string())),
    }
  }

  /// The lowercase name used in serialized form.
  /// Must match the `rename_all = "lowercase"` serde tags above.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Limit => "limit",
      Self::Restriction => "restriction",
      Self::Requirement => "requirement",
    }
  }
}

// ─── Provenance ──────────────────────────────────────────────────────────────

/// Where in the source document a rule was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSection {
  pub page:      u32,
  /// Paragraph label as printed in the document, e.g. "4.2(b)".
  pub paragraph: String,
  /// Verbatim quote backing the extraction.
  pub quote:     String,
}

// ─── Rule ────────────────────────────────────────────────────────────────────

/// A single compliance rule extracted from an investment guideline document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
  pub rule_id:    String,
  pub name:       String,
  pub category:   RuleCategory,
  /// Free-form threshold expression, e.g. "≤10%" or "Investment grade only".
  pub threshold:  String,
  /// Extraction confidence in [0, 100].
  pub confidence: u8,
  pub source:     Option<SourceSection>,
  /// Exception conditions noted in the document, if any.
  pub exceptions: Option<String>,
}

impl Rule {
  /// Convenience constructor with no provenance and no exceptions.
  pub fn new(
    rule_id: impl Into<String>,
    name: impl Into<String>,
    category: RuleCategory,
    threshold: impl Into<String>,
    confidence: u8,
  ) -> Self {
    Self {
      rule_id: rule_id.into(),
      name: name.into(),
      category,
      threshold: threshold.into(),
      confidence,
      source: None,
      exceptions: None,
    }
  }
}
