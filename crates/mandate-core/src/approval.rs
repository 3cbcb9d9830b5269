//! The approval state machine bridging agent responses and user decisions.
//!
//! Phase is explicit data, never inferred from payload shape ("has a score"
//! does not mean "validated"). The transition table in [`next_phase`] is the
//! single authority on which action applies in which phase; everything
//! outside it is a harmless no-op, because stale and duplicate UI actions
//! are expected.

use serde::{Deserialize, Serialize};

use crate::{breach::Breach, rule::Rule};

// ─── Phase ───────────────────────────────────────────────────────────────────

/// Where a pending approval sits in the two-phase pipeline.
/// Declaration order gives the derived `Ord` the pipeline direction, so
/// "phase only moves forward" is `next > current`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalPhase {
  /// Rules extracted; waiting for the user to send them to validation.
  AwaitingValidation,
  /// Validation done; waiting for the user to commit or discard.
  AwaitingCommit,
}

// ─── Events and transitions ──────────────────────────────────────────────────

/// A user or agent event fed to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalEvent {
  /// An extraction round trip produced a candidate rule list (possibly
  /// empty).
  ExtractionSucceeded,
  /// The user sent the extracted rules to portfolio validation.
  Approve,
  /// The user committed the validated rules as a new version.
  Commit,
  /// The user abandoned the pending rules.
  Discard,
}

/// The result of applying an event to a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  /// The event applies; move to the given phase (`None` is terminal).
  Advance(Option<ApprovalPhase>),
  /// The event does not apply in the current phase.
  Ignore,
}

/// The transition table.
///
/// | Current             | Event               | Next                |
/// |---------------------|---------------------|---------------------|
/// | none                | ExtractionSucceeded | awaiting validation |
/// | awaiting validation | Approve             | awaiting commit     |
/// | awaiting validation | Discard             | none                |
/// | awaiting commit     | Commit              | none                |
/// | awaiting commit     | Discard             | none                |
///
/// Guards (the extraction payload parsed, the validation call succeeded, the
/// store accepted the commit) are checked by the orchestrator before it
/// applies the advance.
pub fn next_phase(
  current: Option<ApprovalPhase>,
  event: ApprovalEvent,
) -> Transition {
  use ApprovalEvent as E;
  use ApprovalPhase as P;
  match (current, event) {
    (None, E::ExtractionSucceeded) => {
      Transition::Advance(Some(P::AwaitingValidation))
    }
    (Some(P::AwaitingValidation), E::Approve) => {
      Transition::Advance(Some(P::AwaitingCommit))
    }
    (Some(P::AwaitingValidation), E::Discard) => Transition::Advance(None),
    (Some(P::AwaitingCommit), E::Commit) => Transition::Advance(None),
    (Some(P::AwaitingCommit), E::Discard) => Transition::Advance(None),
    _ => Transition::Ignore,
  }
}

// ─── Ignore reasons ──────────────────────────────────────────────────────────

/// Why a workflow action was ignored instead of applied.
///
/// Benign by design: surfaced so callers can log or report it, never raised
/// as an error to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
  /// The referenced message has no pending approval (already resolved, or
  /// never had one).
  NoPendingApproval,
  /// The approval exists but is not in the phase the action requires.
  WrongPhase,
  /// An agent round trip for this approval is already outstanding.
  RequestInFlight,
  /// The approval was cleared while a round trip was outstanding; its
  /// result was dropped.
  ApprovalCleared,
}

// ─── Pending approval ────────────────────────────────────────────────────────

/// Transient approval state attached to one conversational exchange.
///
/// Exists only between an agent response and the user's resolving action;
/// destroyed (not archived) on resolution. After validation it carries the
/// returned score and breaches alongside the original rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingApproval {
  pub phase:     ApprovalPhase,
  pub rules:     Vec<Rule>,
  /// Originating document filename; `None` for approvals born from freeform
  /// queries.
  pub filename:  Option<String>,
  /// Compliance score in [0, 100], present once validation has run.
  pub score:     Option<u8>,
  pub breaches:  Vec<Breach>,
  /// True while an agent round trip on behalf of this approval is
  /// outstanding. Guards against double-firing the validation request.
  #[serde(default)]
  pub in_flight: bool,
}

impl PendingApproval {
  /// A fresh approval for just-extracted rules.
  pub fn awaiting_validation(
    rules: Vec<Rule>,
    filename: Option<String>,
  ) -> Self {
    Self {
      phase: ApprovalPhase::AwaitingValidation,
      rules,
      filename,
      score: None,
      breaches: Vec::new(),
      in_flight: false,
    }
  }

  /// Advance to the commit-decision phase with the validation results,
  /// preserving the rule list and filename.
  pub fn into_awaiting_commit(
    self,
    score: Option<u8>,
    breaches: Vec<Breach>,
  ) -> Self {
    Self {
      phase: ApprovalPhase::AwaitingCommit,
      score,
      breaches,
      in_flight: false,
      ..self
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn table_covers_the_pipeline() {
    use ApprovalEvent as E;
    use ApprovalPhase as P;

    assert_eq!(
      next_phase(None, E::ExtractionSucceeded),
      Transition::Advance(Some(P::AwaitingValidation)),
    );
    assert_eq!(
      next_phase(Some(P::AwaitingValidation), E::Approve),
      Transition::Advance(Some(P::AwaitingCommit)),
    );
    assert_eq!(
      next_phase(Some(P::AwaitingValidation), E::Discard),
      Transition::Advance(None),
    );
    assert_eq!(
      next_phase(Some(P::AwaitingCommit), E::Commit),
      Transition::Advance(None),
    );
    assert_eq!(
      next_phase(Some(P::AwaitingCommit), E::Discard),
      Transition::Advance(None),
    );
  }

  #[test]
  fn commit_is_unreachable_before_validation() {
    assert_eq!(
      next_phase(Some(ApprovalPhase::AwaitingValidation), ApprovalEvent::Commit),
      Transition::Ignore,
    );
    assert_eq!(next_phase(None, ApprovalEvent::Commit), Transition::Ignore);
  }

  #[test]
  fn stale_events_are_ignored_not_errors() {
    assert_eq!(next_phase(None, ApprovalEvent::Approve), Transition::Ignore);
    assert_eq!(next_phase(None, ApprovalEvent::Discard), Transition::Ignore);
    assert_eq!(
      next_phase(
        Some(ApprovalPhase::AwaitingCommit),
        ApprovalEvent::Approve
      ),
      Transition::Ignore,
    );
    assert_eq!(
      next_phase(
        Some(ApprovalPhase::AwaitingValidation),
        ApprovalEvent::ExtractionSucceeded
      ),
      Transition::Ignore,
    );
  }

  #[test]
  fn phases_order_forward() {
    assert!(ApprovalPhase::AwaitingCommit > ApprovalPhase::AwaitingValidation);
  }

  #[test]
  fn advancing_preserves_rules_and_filename() {
    let rules = vec![crate::rule::Rule::new(
      "R1",
      "Single issuer cap",
      crate::rule::RuleCategory::Limit,
      "≤10%",
      95,
    )];
    let approval = PendingApproval::awaiting_validation(
      rules.clone(),
      Some("guidelines.pdf".to_string()),
    );
    let advanced = approval.into_awaiting_commit(Some(82), Vec::new());
    assert_eq!(advanced.phase, ApprovalPhase::AwaitingCommit);
    assert_eq!(advanced.rules, rules);
    assert_eq!(advanced.filename.as_deref(), Some("guidelines.pdf"));
    assert_eq!(advanced.score, Some(82));
    assert!(!advanced.in_flight);
  }
}
