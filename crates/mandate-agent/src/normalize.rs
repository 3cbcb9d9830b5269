//! Normalization of raw agent payloads into [`AgentReply`].
//!
//! The agent service does not commit to one response schema. The same
//! logical field arrives under a flat key on one run and nested inside an
//! `aggregated_analysis` wrapper on the next, field names drift between
//! long and short forms, and numbers sometimes come back as strings. This
//! module accepts every shape observed in practice and reduces them all to
//! one canonical reply, so nothing downstream ever branches on payload
//! shape.
//!
//! Degradation rules: a row missing its identity fields is dropped, an
//! unknown enum name falls back to the mildest member, and a missing
//! collection normalizes to empty. A malformed payload therefore yields
//! zero rules and zero breaches, never a hard failure.

use std::collections::HashSet;

use mandate_core::{
  agent::{AgentReply, AmbiguityFlag},
  breach::{Breach, Severity},
  rule::{Rule, RuleCategory, SourceSection},
};
use serde_json::Value;

use crate::{Error, Result};

const RULES_KEYS: &[&str] = &["extracted_rules", "rules_table", "rules"];
const SCORE_KEYS: &[&str] = &["overall_compliance_score", "compliance_score"];
const BREACHES_KEYS: &[&str] = &["breaches", "breach_summary"];
const FLAGS_KEYS: &[&str] = &["flagged_for_review", "ambiguity_flags"];

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Reduce a raw agent payload to the canonical [`AgentReply`].
///
/// Returns `Err` only for an explicit non-success status; every structural
/// problem degrades instead.
pub fn normalize(payload: Value) -> Result<AgentReply> {
  // Some gateways wrap the whole reply in a single `response` object.
  let body = match payload.get("response") {
    Some(inner) if inner.is_object() => inner,
    _ => &payload,
  };

  if let Some(status) = text(body, &["status"]) {
    if !status.eq_ignore_ascii_case("success") {
      return Err(Error::Agent(status));
    }
  }

  let message = text(body, &["message"]);
  let result = match body.get("result") {
    Some(inner) if inner.is_object() => inner,
    _ => body,
  };

  let rules = rules_from(result);
  let score = score_from(result);
  let breaches = breaches_from(result);
  let flags = flags_from(result);

  if let Some(rules) = &rules {
    tracing::debug!(
      rules = rules.len(),
      breaches = breaches.len(),
      flags = flags.len(),
      score = ?score,
      "normalized extraction-shaped agent reply"
    );
  }

  Ok(AgentReply { message, rules, score, breaches, flags, raw: payload })
}

// ─── Container walk ──────────────────────────────────────────────────────────

/// The objects a result field may live in: the result object itself, then
/// its `aggregated_analysis` wrapper when present.
fn containers(result: &Value) -> impl Iterator<Item = &Value> {
  std::iter::once(result).chain(
    result
      .get("aggregated_analysis")
      .filter(|v| v.is_object()),
  )
}

/// First array found under any of `keys` in any container.
fn array<'v>(result: &'v Value, keys: &[&str]) -> Option<&'v Vec<Value>> {
  containers(result)
    .flat_map(|c| keys.iter().filter_map(move |k| c.get(*k)))
    .find_map(Value::as_array)
}

fn rules_from(result: &Value) -> Option<Vec<Rule>> {
  let items = array(result, RULES_KEYS)?;

  let mut seen: HashSet<String> = HashSet::new();
  let rules = items
    .iter()
    .filter_map(rule_from)
    .filter(|r| seen.insert(r.rule_id.clone()))
    .collect();
  Some(rules)
}

fn score_from(result: &Value) -> Option<u8> {
  containers(result)
    .flat_map(|c| SCORE_KEYS.iter().filter_map(move |k| c.get(*k)))
    .find_map(lenient_number)
    .map(clamp_percent)
}

fn breaches_from(result: &Value) -> Vec<Breach> {
  array(result, BREACHES_KEYS)
    .map(|items| items.iter().filter_map(breach_from).collect())
    .unwrap_or_default()
}

fn flags_from(result: &Value) -> Vec<AmbiguityFlag> {
  array(result, FLAGS_KEYS)
    .map(|items| items.iter().filter_map(flag_from).collect())
    .unwrap_or_default()
}

// ─── Row conversion ──────────────────────────────────────────────────────────

/// A rule row. Identity is `rule_id`; rows without one are dropped.
fn rule_from(v: &Value) -> Option<Rule> {
  let rule_id = text(v, &["rule_id"])?;
  let name = text(v, &["rule_name", "name"]).unwrap_or_else(|| rule_id.clone());
  let category = text(v, &["rule_type", "category"])
    .and_then(|s| RuleCategory::parse(&s).ok())
    .unwrap_or(RuleCategory::Requirement);
  let threshold =
    display(v, &["value_threshold", "threshold"]).unwrap_or_default();
  let confidence = number(v, &["confidence_score", "confidence"])
    .map(clamp_percent)
    .unwrap_or(0);
  let source = v.get("source_section").and_then(source_from);
  let exceptions = text(v, &["exception_conditions", "exceptions"]);

  Some(Rule {
    rule_id,
    name,
    category,
    threshold,
    confidence,
    source,
    exceptions,
  })
}

fn source_from(v: &Value) -> Option<SourceSection> {
  if !v.is_object() {
    return None;
  }
  Some(SourceSection {
    page:      number(v, &["page"]).unwrap_or(0.0).max(0.0) as u32,
    paragraph: text(v, &["paragraph"]).unwrap_or_default(),
    quote:     text(v, &["exact_quote", "quote"]).unwrap_or_default(),
  })
}

/// A breach row. Identity is the fund plus the violated rule's name; rows
/// missing either are dropped.
fn breach_from(v: &Value) -> Option<Breach> {
  let fund = text(v, &["fund_name", "fund"])?;
  let rule = text(v, &["rule_violated", "rule"])?;
  let observed =
    display(v, &["current_value", "observed"]).unwrap_or_default();
  let limit = display(v, &["limit"]).unwrap_or_default();
  let severity = text(v, &["severity"])
    .and_then(|s| Severity::parse(&s).ok())
    .unwrap_or(Severity::Low);
  let remediation = text(v, &["remediation_suggestion", "remediation"]);

  Some(Breach { fund, rule, observed, limit, severity, remediation })
}

fn flag_from(v: &Value) -> Option<AmbiguityFlag> {
  let issue = text(v, &["issue"])?;
  let recommendation = text(v, &["recommendation"]).unwrap_or_default();
  Some(AmbiguityFlag { issue, recommendation })
}

// ─── Field helpers ───────────────────────────────────────────────────────────

/// First string value under any of `keys`. Non-string values are skipped,
/// not coerced.
fn text(v: &Value, keys: &[&str]) -> Option<String> {
  keys
    .iter()
    .find_map(|k| v.get(*k).and_then(Value::as_str))
    .map(str::to_owned)
}

/// First display value under any of `keys` — strings pass through, bare
/// numbers are stringified. Thresholds and observed values arrive both
/// ways.
fn display(v: &Value, keys: &[&str]) -> Option<String> {
  keys.iter().find_map(|k| match v.get(*k) {
    Some(Value::String(s)) => Some(s.clone()),
    Some(Value::Number(n)) => Some(n.to_string()),
    _ => None,
  })
}

/// First numeric value under any of `keys`, accepting numeric strings.
fn number(v: &Value, keys: &[&str]) -> Option<f64> {
  keys.iter().find_map(|k| v.get(*k).and_then(lenient_number))
}

/// A number that may arrive as a JSON number or as a numeric string, with
/// or without a trailing `%`.
fn lenient_number(v: &Value) -> Option<f64> {
  match v {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => {
      s.trim().trim_end_matches('%').trim_end().parse::<f64>().ok()
    }
    _ => None,
  }
}

fn clamp_percent(n: f64) -> u8 { n.clamp(0.0, 100.0).round() as u8 }

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn flat_extraction_shape() {
    let reply = normalize(json!({
      "status": "success",
      "message": "Extraction complete.",
      "result": {
        "extracted_rules": [
          {
            "rule_id": "R01",
            "rule_name": "Single issuer limit",
            "rule_type": "limit",
            "value_threshold": "≤10% of NAV",
            "confidence_score": 95,
            "source_section": {
              "page": 3,
              "paragraph": "4.2(b)",
              "exact_quote": "no single issuer shall exceed ten percent"
            },
            "exception_conditions": "government bonds exempt"
          },
          {
            "rule_id": "R02",
            "rule_name": "Cash ceiling",
            "rule_type": "limit",
            "value_threshold": "≤15%",
            "confidence_score": 88
          }
        ]
      }
    }))
    .unwrap();

    assert_eq!(reply.message.as_deref(), Some("Extraction complete."));
    let rules = reply.rules.unwrap();
    assert_eq!(rules.len(), 2);

    let r = &rules[0];
    assert_eq!(r.rule_id, "R01");
    assert_eq!(r.name, "Single issuer limit");
    assert_eq!(r.category, RuleCategory::Limit);
    assert_eq!(r.threshold, "≤10% of NAV");
    assert_eq!(r.confidence, 95);
    assert_eq!(r.exceptions.as_deref(), Some("government bonds exempt"));
    let source = r.source.as_ref().unwrap();
    assert_eq!(source.page, 3);
    assert_eq!(source.paragraph, "4.2(b)");
    assert!(source.quote.starts_with("no single issuer"));

    assert!(rules[1].source.is_none());
  }

  #[test]
  fn aggregated_analysis_shape() {
    let reply = normalize(json!({
      "status": "success",
      "result": {
        "aggregated_analysis": {
          "rules_table": [
            { "rule_id": "R01", "name": "Cash ceiling", "category": "limit",
              "threshold": "≤15%", "confidence": 90 }
          ],
          "overall_compliance_score": 82,
          "breach_summary": [
            { "fund": "Asia Growth Fund", "rule": "Cash ceiling",
              "observed": "18%", "limit": "15%", "severity": "medium",
              "remediation": "Deploy excess cash within 30 days" }
          ],
          "ambiguity_flags": [
            { "issue": "Cash definition may include money market funds",
              "recommendation": "Confirm definition with the client" }
          ]
        }
      }
    }))
    .unwrap();

    let rules = reply.rules.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].name, "Cash ceiling");
    assert_eq!(reply.score, Some(82));
    assert_eq!(reply.breaches.len(), 1);
    assert_eq!(reply.breaches[0].severity, Severity::Medium);
    assert_eq!(reply.flags.len(), 1);
    assert!(reply.flags[0].issue.contains("money market"));
  }

  #[test]
  fn long_form_breach_aliases() {
    let reply = normalize(json!({
      "result": {
        "overall_compliance_score": "87.5",
        "breaches": [
          {
            "fund_name": "Global Equity Fund",
            "rule_violated": "Single issuer limit",
            "current_value": 12.4,
            "limit": "10%",
            "severity": "HIGH",
            "remediation_suggestion": "Trim issuer exposure below 10%"
          }
        ]
      }
    }))
    .unwrap();

    assert_eq!(reply.score, Some(88));
    let b = &reply.breaches[0];
    assert_eq!(b.fund, "Global Equity Fund");
    assert_eq!(b.rule, "Single issuer limit");
    assert_eq!(b.observed, "12.4");
    assert_eq!(b.severity, Severity::High);
    assert_eq!(
      b.remediation.as_deref(),
      Some("Trim issuer exposure below 10%")
    );
  }

  #[test]
  fn response_wrapper_is_peeled() {
    let reply = normalize(json!({
      "response": {
        "status": "success",
        "message": "Hello.",
        "result": { "extracted_rules": [{ "rule_id": "R01" }] }
      }
    }))
    .unwrap();

    assert_eq!(reply.message.as_deref(), Some("Hello."));
    assert_eq!(reply.rules.unwrap().len(), 1);
  }

  #[test]
  fn non_success_status_is_an_error() {
    let err = normalize(json!({ "status": "error", "message": "overloaded" }))
      .unwrap_err();
    assert!(matches!(err, Error::Agent(ref s) if s == "error"));
  }

  #[test]
  fn freeform_reply_has_no_rules() {
    let reply = normalize(json!({
      "status": "success",
      "message": "Cash limits are typically 15% of NAV."
    }))
    .unwrap();

    assert!(reply.rules.is_none());
    assert!(reply.breaches.is_empty());
    assert!(reply.score.is_none());
  }

  #[test]
  fn empty_rules_array_is_extraction_shaped() {
    let reply = normalize(json!({
      "status": "success",
      "result": { "extracted_rules": [] }
    }))
    .unwrap();

    assert_eq!(reply.rules, Some(vec![]));
  }

  #[test]
  fn rows_without_rule_id_are_dropped() {
    let reply = normalize(json!({
      "result": { "extracted_rules": [
        { "rule_name": "No identity" },
        { "rule_id": "R01", "rule_name": "Kept" },
        "not even an object"
      ]}
    }))
    .unwrap();

    let rules = reply.rules.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].rule_id, "R01");
  }

  #[test]
  fn duplicate_rule_ids_first_wins() {
    let reply = normalize(json!({
      "result": { "extracted_rules": [
        { "rule_id": "R01", "rule_name": "First" },
        { "rule_id": "R01", "rule_name": "Second" }
      ]}
    }))
    .unwrap();

    let rules = reply.rules.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].name, "First");
  }

  #[test]
  fn unknown_enum_names_fall_back() {
    let reply = normalize(json!({
      "result": {
        "extracted_rules": [
          { "rule_id": "R01", "rule_type": "mandate-exotic" }
        ],
        "breaches": [
          { "fund": "F", "rule": "R", "severity": "catastrophic" }
        ]
      }
    }))
    .unwrap();

    assert_eq!(reply.rules.unwrap()[0].category, RuleCategory::Requirement);
    assert_eq!(reply.breaches[0].severity, Severity::Low);
  }

  #[test]
  fn missing_name_falls_back_to_rule_id() {
    let reply = normalize(json!({
      "result": { "extracted_rules": [{ "rule_id": "R07" }] }
    }))
    .unwrap();

    let rules = reply.rules.unwrap();
    assert_eq!(rules[0].name, "R07");
    assert_eq!(rules[0].threshold, "");
    assert_eq!(rules[0].confidence, 0);
  }

  #[test]
  fn score_strings_and_clamping() {
    let score = |v: Value| {
      normalize(json!({ "result": { "overall_compliance_score": v } }))
        .unwrap()
        .score
    };

    assert_eq!(score(json!(92)), Some(92));
    assert_eq!(score(json!("73")), Some(73));
    assert_eq!(score(json!("87%")), Some(87));
    assert_eq!(score(json!(130)), Some(100));
    assert_eq!(score(json!(-4)), Some(0));
    assert_eq!(score(json!("not a score")), None);
  }

  #[test]
  fn flat_score_beats_aggregated_score() {
    let reply = normalize(json!({
      "result": {
        "compliance_score": 70,
        "aggregated_analysis": { "overall_compliance_score": 40 }
      }
    }))
    .unwrap();

    // Flat container is searched first.
    assert_eq!(reply.score, Some(70));
  }

  #[test]
  fn malformed_payload_degrades_to_nothing() {
    let reply = normalize(json!({ "result": "gibberish" })).unwrap();
    assert!(reply.rules.is_none());
    assert!(reply.breaches.is_empty());
    assert!(reply.flags.is_empty());
    assert!(reply.score.is_none());
  }

  #[test]
  fn raw_payload_is_retained() {
    let payload = json!({ "status": "success", "message": "hi" });
    let reply = normalize(payload.clone()).unwrap();
    assert_eq!(reply.raw, payload);
  }
}
