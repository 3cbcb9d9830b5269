//! Rule-set diff engine: classify rules between two versions as added,
//! removed, or modified.
//!
//! Matching is by rule identifier only — no fuzzy matching, so diffs are
//! deterministic. The trade-off: a rule that was renamed *and* given a new
//! identifier shows up as one removal plus one addition, not as a single
//! modification.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{rule::Rule, version::ChangeSummary};

// ─── Result types ────────────────────────────────────────────────────────────

/// A rule present in both lists whose threshold or category changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifiedRule {
  pub old: Rule,
  pub new: Rule,
}

/// The classified difference between two rule lists.
///
/// `added` and `modified` follow the order of the new list; `removed`
/// follows the order of the old list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleDiff {
  pub added:    Vec<Rule>,
  pub removed:  Vec<Rule>,
  pub modified: Vec<ModifiedRule>,
}

impl RuleDiff {
  /// The change-summary triple frozen onto a committed version.
  pub fn summary(&self) -> ChangeSummary {
    ChangeSummary {
      added:    self.added.len(),
      removed:  self.removed.len(),
      modified: self.modified.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
  }
}

// ─── Diff ────────────────────────────────────────────────────────────────────

/// Classify every rule identifier in `old` and `new`.
///
/// A shared identifier counts as modified when its threshold expression or
/// category differs; name and confidence changes alone do not dirty the
/// diff. Identifiers are assumed unique within each list.
pub fn diff(old: &[Rule], new: &[Rule]) -> RuleDiff {
  let old_by_id: HashMap<&str, &Rule> =
    old.iter().map(|r| (r.rule_id.as_str(), r)).collect();
  let new_ids: HashSet<&str> =
    new.iter().map(|r| r.rule_id.as_str()).collect();

  let mut result = RuleDiff::default();
  for rule in new {
    match old_by_id.get(rule.rule_id.as_str()) {
      None => result.added.push(rule.clone()),
      Some(prev)
        if prev.threshold != rule.threshold
          || prev.category != rule.category =>
      {
        result.modified.push(ModifiedRule {
          old: (*prev).clone(),
          new: rule.clone(),
        });
      }
      Some(_) => {}
    }
  }
  result.removed = old
    .iter()
    .filter(|r| !new_ids.contains(r.rule_id.as_str()))
    .cloned()
    .collect();
  result
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::rule::RuleCategory;

  fn rule(id: &str, threshold: &str) -> Rule {
    Rule::new(id, format!("Rule {id}"), RuleCategory::Limit, threshold, 90)
  }

  #[test]
  fn empty_lists_diff_empty() {
    let d = diff(&[], &[]);
    assert!(d.is_empty());
    assert_eq!(d.summary(), ChangeSummary::default());
  }

  #[test]
  fn no_predecessor_everything_added() {
    let new: Vec<Rule> = (1..=4).map(|i| rule(&format!("R{i}"), "≤5%")).collect();
    let d = diff(&[], &new);
    assert_eq!(d.summary().added, 4);
    assert_eq!(d.summary().removed, 0);
    assert_eq!(d.summary().modified, 0);
  }

  #[test]
  fn identical_lists_diff_empty() {
    let rules: Vec<Rule> =
      (1..=3).map(|i| rule(&format!("R{i}"), "≤10%")).collect();
    assert!(diff(&rules, &rules).is_empty());
  }

  #[test]
  fn threshold_change_is_modified() {
    let old = vec![rule("R1", "≤10%")];
    let new = vec![rule("R1", "≤15%")];
    let d = diff(&old, &new);
    assert_eq!(d.summary(), ChangeSummary { added: 0, removed: 0, modified: 1 });
    assert_eq!(d.modified[0].old.threshold, "≤10%");
    assert_eq!(d.modified[0].new.threshold, "≤15%");
  }

  #[test]
  fn category_change_is_modified() {
    let old = vec![rule("R1", "≤10%")];
    let mut changed = rule("R1", "≤10%");
    changed.category = RuleCategory::Restriction;
    let d = diff(&old, &[changed]);
    assert_eq!(d.summary().modified, 1);
  }

  #[test]
  fn name_change_alone_is_not_modified() {
    let old = vec![rule("R1", "≤10%")];
    let mut renamed = rule("R1", "≤10%");
    renamed.name = "Issuer concentration cap".to_string();
    renamed.confidence = 40;
    let d = diff(&old, &[renamed]);
    assert!(d.is_empty());
  }

  #[test]
  fn version_upgrade_scenario() {
    // v1: 18 rules. v2: drops one, adds three, changes two thresholds.
    let v1: Vec<Rule> =
      (1..=18).map(|i| rule(&format!("R{i:02}"), "≤10%")).collect();

    let mut v2: Vec<Rule> = v1
      .iter()
      .filter(|r| r.rule_id != "R05")
      .cloned()
      .collect();
    for r in v2.iter_mut() {
      if r.rule_id == "R02" || r.rule_id == "R03" {
        r.threshold = "≤12%".to_string();
      }
    }
    v2.push(rule("R19", "≤3%"));
    v2.push(rule("R20", "No derivatives"));
    v2.push(rule("R21", "≥90% investment grade"));

    let d = diff(&v1, &v2);
    assert_eq!(
      d.summary(),
      ChangeSummary { added: 3, removed: 1, modified: 2 },
    );
    assert_eq!(d.removed[0].rule_id, "R05");
  }

  #[test]
  fn added_set_mirrors_removed_set() {
    let a: Vec<Rule> =
      vec![rule("R1", "≤10%"), rule("R2", "≤5%"), rule("R3", "≥2%")];
    let b: Vec<Rule> =
      vec![rule("R2", "≤7%"), rule("R4", "No leverage"), rule("R5", "≤1%")];

    let ab = diff(&a, &b);
    let ba = diff(&b, &a);

    let added_ids: Vec<&str> =
      ab.added.iter().map(|r| r.rule_id.as_str()).collect();
    let removed_ids: Vec<&str> =
      ba.removed.iter().map(|r| r.rule_id.as_str()).collect();
    assert_eq!(added_ids, removed_ids);
    assert_eq!(ab.summary().modified, ba.summary().modified);
  }
}
