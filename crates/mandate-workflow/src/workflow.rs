//! [`Workflow`] — the orchestrator driving the approval pipeline.

use std::sync::Arc;

use mandate_core::{
  agent::{Agent, AgentReply},
  approval::{
    next_phase, ApprovalEvent, ApprovalPhase, IgnoreReason, PendingApproval,
    Transition,
  },
  conversation::{Conversation, Message, Role},
  store::{VersionDraft, VersionStore},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::Outcome;

const WELCOME: &str =
  "Welcome to the Compliance Assistant. I can help you extract rules from \
   investment guidelines, check portfolio compliance, and answer questions \
   about regulations. How can I assist you today?";
const REPLY_FALLBACK: &str = "Response received";
const VALIDATION_COMPLETE: &str =
  "Portfolio validation complete. Review the compliance results below.";
const DISCARDED: &str = "Rules extraction ignored. The document was not \
                         added to version control.";
const QUERY_FAILED: &str = "Sorry, I encountered an error processing your \
                            request. Please try again.";
const FILE_FAILED: &str = "Error processing file. Please try again.";

/// The approval workflow for one conversation.
///
/// Owns the conversation log; shares the version store with read-side
/// callers. The session mutex makes each workflow action atomic with
/// respect to the log, while agent round trips run outside it so the
/// conversation stays responsive — the in-flight marker on the approval,
/// not the lock, is what prevents double-fired validation requests.
pub struct Workflow<S, A> {
  store:   Arc<S>,
  agent:   A,
  session: Mutex<Conversation>,
}

impl<S, A> Workflow<S, A>
where
  S: VersionStore,
  A: Agent,
{
  /// A fresh workflow with the assistant's welcome as the first turn.
  pub fn new(store: Arc<S>, agent: A) -> Self {
    let mut session = Conversation::new();
    session.append(Role::Assistant, WELCOME);
    Self { store, agent, session: Mutex::new(session) }
  }

  /// Snapshot of the full conversation log, in append order.
  pub async fn conversation(&self) -> Vec<Message> {
    self.session.lock().await.messages().to_vec()
  }

  /// Upload a guideline document and request rule extraction.
  ///
  /// On success the assistant reply carries a fresh [`PendingApproval`] in
  /// the review phase — populated with the extracted rules, which may be
  /// empty. On any failure the reply is a generic notice and nothing else
  /// changes.
  pub async fn submit_document(
    &self,
    filename: &str,
    contents: Vec<u8>,
  ) -> Message {
    self
      .session
      .lock()
      .await
      .append(Role::User, format!("Uploaded file: {filename}"));

    let reply = match self.agent.upload(filename, contents).await {
      Ok(assets) => self.agent.extract_rules(filename, &assets).await,
      Err(e) => Err(e),
    };

    let mut session = self.session.lock().await;
    match reply {
      Ok(reply) => {
        let AgentReply { rules, raw, .. } = reply;
        let rules = rules.unwrap_or_default();
        tracing::info!(filename, rules = rules.len(), "rules extracted");

        let content = format!(
          "I've extracted {} compliance rules from {filename}. Please \
           review the rules below.",
          rules.len()
        );
        let approval = PendingApproval::awaiting_validation(
          rules,
          Some(filename.to_owned()),
        );
        session.append_full(Role::Assistant, content, Some(raw), Some(approval))
      }
      Err(e) => {
        tracing::warn!(error = %e, filename, "document processing failed");
        session.append(Role::Assistant, FILE_FAILED)
      }
    }
  }

  /// Send freeform user text to the agent.
  ///
  /// Agent responses are polymorphic and get duck-typed: when one happens
  /// to match the extraction-result shape, the reply receives the same
  /// review treatment as a document upload (with no filename). Otherwise
  /// it is a plain chat turn.
  pub async fn submit_query(&self, text: &str) -> Message {
    self.session.lock().await.append(Role::User, text);

    let result = self.agent.answer(text).await;

    let mut session = self.session.lock().await;
    match result {
      Ok(reply) => {
        let AgentReply { message, rules, raw, .. } = reply;
        let content = message.unwrap_or_else(|| REPLY_FALLBACK.to_owned());
        let approval =
          rules.map(|rules| PendingApproval::awaiting_validation(rules, None));
        session.append_full(Role::Assistant, content, Some(raw), approval)
      }
      Err(e) => {
        tracing::warn!(error = %e, "freeform query failed");
        session.append(Role::Assistant, QUERY_FAILED)
      }
    }
  }

  /// Send the rules pending on `id` to portfolio validation.
  ///
  /// No-op unless the message holds an approval in the review phase with no
  /// round trip outstanding. On success the approval advances to the
  /// commit-decision phase carrying the returned score and breaches; on
  /// failure it stays in the review phase so the user can retry.
  pub async fn approve_for_validation(&self, id: Uuid) -> Outcome {
    let snapshot = {
      let mut session = self.session.lock().await;

      let (phase, in_flight) = match session.approval(id) {
        Some(approval) => (approval.phase, approval.in_flight),
        None => return ignored(id, IgnoreReason::NoPendingApproval),
      };
      if in_flight {
        return ignored(id, IgnoreReason::RequestInFlight);
      }
      match next_phase(Some(phase), ApprovalEvent::Approve) {
        Transition::Advance(_) => {}
        Transition::Ignore => return ignored(id, IgnoreReason::WrongPhase),
      }

      match session.begin_round_trip(id) {
        Some(snapshot) => snapshot,
        // Unreachable while the lock is held, but never worth a panic.
        None => return ignored(id, IgnoreReason::NoPendingApproval),
      }
    };

    let result = self.agent.validate_rules(&snapshot.rules).await;

    let mut session = self.session.lock().await;
    match result {
      Ok(reply) => {
        // Lost-update guard: the approval may have been discarded while
        // the round trip was outstanding. If so, drop the result.
        let still_pending = session
          .approval(id)
          .is_some_and(|a| a.phase == ApprovalPhase::AwaitingValidation);
        if !still_pending {
          return ignored(id, IgnoreReason::ApprovalCleared);
        }

        let AgentReply { score, breaches, raw, .. } = reply;
        tracing::info!(
          message_id = %id,
          score = ?score,
          breaches = breaches.len(),
          "portfolio validation complete"
        );
        session.advance_approval(
          id,
          snapshot.into_awaiting_commit(score, breaches),
        );
        let message = session.append_full(
          Role::Assistant,
          VALIDATION_COMPLETE,
          Some(raw),
          None,
        );
        Outcome::Reply { message }
      }
      Err(e) => {
        tracing::warn!(error = %e, message_id = %id, "validation failed");
        session.end_round_trip(id);
        let message = session.append(Role::Assistant, QUERY_FAILED);
        Outcome::Reply { message }
      }
    }
  }

  /// Commit the validated rules pending on `id` as a new version.
  ///
  /// No-op unless the message holds an approval in the commit-decision
  /// phase — commit is never reachable straight from extraction. The store
  /// call runs under the session lock, so commits from one conversation
  /// are strictly ordered. A store failure keeps the approval alive for a
  /// retry.
  pub async fn commit(&self, id: Uuid) -> Outcome {
    let mut session = self.session.lock().await;

    let approval = match session.approval(id) {
      Some(approval) => approval,
      None => return ignored(id, IgnoreReason::NoPendingApproval),
    };
    match next_phase(Some(approval.phase), ApprovalEvent::Commit) {
      Transition::Advance(_) => {}
      Transition::Ignore => return ignored(id, IgnoreReason::WrongPhase),
    }

    let draft = VersionDraft {
      rules:    approval.rules.clone(),
      filename: approval.filename.clone(),
      score:    approval.score,
      breaches: approval.breaches.clone(),
    };

    match self.store.commit_version(draft).await {
      Ok(version) => {
        tracing::info!(
          version = %version.version_id,
          rules = version.rule_count,
          "version committed"
        );
        session.clear_approval(id);
        let message = session.append(
          Role::Assistant,
          format!(
            "Successfully added {} with {} rules. This version is now \
             current and reflected in the Compliance Dashboard and Version \
             Control.",
            version.label, version.rule_count
          ),
        );
        Outcome::Reply { message }
      }
      Err(e) => {
        tracing::warn!(error = %e, message_id = %id, "version commit failed");
        let message = session.append(Role::Assistant, QUERY_FAILED);
        Outcome::Reply { message }
      }
    }
  }

  /// Abandon the rules pending on `id`, whatever their phase.
  ///
  /// The store is never touched; the confirmation notes that no version
  /// was affected.
  pub async fn discard(&self, id: Uuid) -> Outcome {
    let mut session = self.session.lock().await;
    match session.clear_approval(id) {
      Some(_) => {
        let message = session.append(Role::Assistant, DISCARDED);
        Outcome::Reply { message }
      }
      None => ignored(id, IgnoreReason::NoPendingApproval),
    }
  }
}

/// Stale actions are logged at debug and swallowed.
fn ignored(id: Uuid, reason: IgnoreReason) -> Outcome {
  tracing::debug!(message_id = %id, reason = ?reason, "workflow action ignored");
  Outcome::Ignored { reason }
}
