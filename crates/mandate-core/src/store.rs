//! The `VersionStore` trait — the append-only version history.
//!
//! Implemented by storage backends (e.g. `mandate-store-sqlite`). Higher
//! layers depend on this abstraction, not on any concrete backend. Callers
//! can only commit whole versions and read them back; there is no way to
//! toggle a version's status directly.

use std::future::Future;

use crate::{
  breach::Breach,
  rule::Rule,
  version::{Version, VersionId},
};

// ─── Draft ───────────────────────────────────────────────────────────────────

/// Input to [`VersionStore::commit_version`]. The ordinal, label, status,
/// change summary, and upload date are all assigned by the store.
#[derive(Debug, Clone)]
pub struct VersionDraft {
  pub rules:    Vec<Rule>,
  pub filename: Option<String>,
  /// Compliance score in [0, 100] if validation ran before commit.
  pub score:    Option<u8>,
  pub breaches: Vec<Breach>,
}

impl VersionDraft {
  /// Draft carrying rules only, with no validation results.
  pub fn new(rules: Vec<Rule>) -> Self {
    Self { rules, filename: None, score: None, breaches: Vec::new() }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the versioned-artifact store.
///
/// Commits are strictly serialized by the implementation: two concurrent
/// commits must never both observe the same previous current version. All
/// methods return `Send` futures.
pub trait VersionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Append a new version with status current, demoting the previous
  /// current version (if any) to archived. The change summary is computed
  /// against the previous current version's rules via [`crate::diff::diff`]
  /// — all `added` when there is no predecessor — and then frozen.
  fn commit_version(
    &self,
    draft: VersionDraft,
  ) -> impl Future<Output = Result<Version, Self::Error>> + Send + '_;

  /// Retrieve one version by ordinal. Returns `None` if not found.
  fn get_version(
    &self,
    id: VersionId,
  ) -> impl Future<Output = Result<Option<Version>, Self::Error>> + Send + '_;

  /// All versions, in insertion order.
  fn list_versions(
    &self,
  ) -> impl Future<Output = Result<Vec<Version>, Self::Error>> + Send + '_;

  /// The unique version with status current, or `None` while the store is
  /// empty.
  fn current(
    &self,
  ) -> impl Future<Output = Result<Option<Version>, Self::Error>> + Send + '_;
}
