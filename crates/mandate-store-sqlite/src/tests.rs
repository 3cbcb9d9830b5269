//! Integration tests for `SqliteStore` against an in-memory database.

use mandate_core::{
  breach::{Breach, Severity},
  rule::{Rule, RuleCategory, SourceSection},
  store::{VersionDraft, VersionStore},
  version::{VersionId, VersionStatus},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn rule(id: &str, threshold: &str) -> Rule {
  Rule::new(id, format!("Rule {id}"), RuleCategory::Limit, threshold, 90)
}

// ─── Committing ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_commit_counts_everything_as_added() {
  let s = store().await;

  let v = s
    .commit_version(VersionDraft::new(vec![
      rule("R01", "≤10%"),
      rule("R02", "≤5%"),
    ]))
    .await
    .unwrap();

  assert_eq!(v.version_id, VersionId(1));
  assert_eq!(v.label, "Version 1.0");
  assert_eq!(v.rule_count, 2);
  assert_eq!(v.status, VersionStatus::Current);
  assert_eq!(v.changes.added, 2);
  assert_eq!(v.changes.removed, 0);
  assert_eq!(v.changes.modified, 0);
}

#[tokio::test]
async fn second_commit_demotes_the_previous_current() {
  let s = store().await;

  let v1 = s
    .commit_version(VersionDraft::new(vec![rule("R01", "≤10%")]))
    .await
    .unwrap();
  let v2 = s
    .commit_version(VersionDraft::new(vec![
      rule("R01", "≤10%"),
      rule("R02", "≤5%"),
    ]))
    .await
    .unwrap();

  assert_eq!(v2.version_id, VersionId(2));
  assert_eq!(v2.status, VersionStatus::Current);

  let v1_after = s.get_version(v1.version_id).await.unwrap().unwrap();
  assert_eq!(v1_after.status, VersionStatus::Archived);

  let current = s.current().await.unwrap().unwrap();
  assert_eq!(current.version_id, v2.version_id);
}

#[tokio::test]
async fn exactly_one_current_after_many_commits() {
  let s = store().await;

  for i in 1..=5 {
    s.commit_version(VersionDraft::new(vec![rule(
      &format!("R{i:02}"),
      "≤10%",
    )]))
    .await
    .unwrap();
  }

  let all = s.list_versions().await.unwrap();
  assert_eq!(all.len(), 5);
  assert_eq!(all.iter().filter(|v| v.status.is_current()).count(), 1);
  assert_eq!(s.current().await.unwrap().unwrap().version_id, VersionId(5));
}

#[tokio::test]
async fn change_summary_compares_against_previous_current() {
  let s = store().await;

  // 18-rule guideline document.
  let v1_rules: Vec<Rule> = (1..=18)
    .map(|i| rule(&format!("R{i:02}"), "≤10%"))
    .collect();
  s.commit_version(VersionDraft::new(v1_rules.clone()))
    .await
    .unwrap();

  // Amended document: R05 gone, R02/R03 re-thresholded, three rules new.
  let mut v2_rules: Vec<Rule> = v1_rules
    .into_iter()
    .filter(|r| r.rule_id != "R05")
    .collect();
  for r in v2_rules.iter_mut() {
    if r.rule_id == "R02" || r.rule_id == "R03" {
      r.threshold = "≤8%".into();
    }
  }
  v2_rules.push(rule("R19", "≤3%"));
  v2_rules.push(rule("R20", "≤3%"));
  v2_rules.push(rule("R21", "≤3%"));

  let v2 = s.commit_version(VersionDraft::new(v2_rules)).await.unwrap();

  assert_eq!(v2.changes.added, 3);
  assert_eq!(v2.changes.removed, 1);
  assert_eq!(v2.changes.modified, 2);
  assert_eq!(v2.rule_count, 20);
}

#[tokio::test]
async fn empty_rule_set_commits_fine() {
  let s = store().await;

  let v = s.commit_version(VersionDraft::new(vec![])).await.unwrap();
  assert_eq!(v.rule_count, 0);
  assert_eq!(v.changes.added, 0);
  assert!(v.status.is_current());
}

// ─── Reading ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_version_missing_returns_none() {
  let s = store().await;
  assert!(s.get_version(VersionId(99)).await.unwrap().is_none());
}

#[tokio::test]
async fn current_on_empty_store_returns_none() {
  let s = store().await;
  assert!(s.current().await.unwrap().is_none());
}

#[tokio::test]
async fn list_versions_in_insertion_order() {
  let s = store().await;

  for _ in 0..3 {
    s.commit_version(VersionDraft::new(vec![rule("R01", "≤10%")]))
      .await
      .unwrap();
  }

  let all = s.list_versions().await.unwrap();
  let ids: Vec<_> = all.iter().map(|v| v.version_id.0).collect();
  assert_eq!(ids, vec![1, 2, 3]);
}

// ─── Roundtrips ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_draft_roundtrip() {
  let s = store().await;

  let mut r = rule("R01", "≤10%");
  r.source = Some(SourceSection {
    page:      3,
    paragraph: "4.2(b)".into(),
    quote:     "no single issuer shall exceed ten percent".into(),
  });
  r.exceptions = Some("government bonds exempt".into());

  let draft = VersionDraft {
    rules:    vec![r.clone()],
    filename: Some("guidelines_2025.pdf".into()),
    score:    Some(87),
    breaches: vec![Breach {
      fund:        "Global Equity Fund".into(),
      rule:        "Rule R01".into(),
      observed:    "12.4%".into(),
      limit:       "10%".into(),
      severity:    Severity::High,
      remediation: Some("Reduce issuer exposure below 10%".into()),
    }],
  };

  let committed = s.commit_version(draft).await.unwrap();
  let fetched = s
    .get_version(committed.version_id)
    .await
    .unwrap()
    .unwrap();

  assert_eq!(fetched.filename.as_deref(), Some("guidelines_2025.pdf"));
  assert_eq!(fetched.score, Some(87));
  assert_eq!(fetched.rules, vec![r]);
  assert_eq!(fetched.breaches.len(), 1);
  assert_eq!(fetched.breaches[0].severity, Severity::High);
  assert_eq!(fetched.uploaded_at, committed.uploaded_at);
}

#[tokio::test]
async fn versions_survive_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("mandate.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.commit_version(VersionDraft::new(vec![rule("R01", "≤10%")]))
      .await
      .unwrap();
    s.commit_version(VersionDraft::new(vec![
      rule("R01", "≤10%"),
      rule("R02", "≤5%"),
    ]))
    .await
    .unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  let all = s.list_versions().await.unwrap();
  assert_eq!(all.len(), 2);

  let current = s.current().await.unwrap().unwrap();
  assert_eq!(current.version_id, VersionId(2));
  assert_eq!(current.rule_count, 2);
}
