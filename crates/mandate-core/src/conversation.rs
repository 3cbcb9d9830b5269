//! The conversation log — the ordered record of user and assistant turns.
//!
//! Append-only: messages are never deleted or edited. The only mutation is
//! on an attached [`PendingApproval`], which may advance phase or be
//! cleared, never regress. Callers cannot reach into a message to toggle
//! approval state directly; they go through the resolving methods here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::approval::PendingApproval;

// ─── Message ─────────────────────────────────────────────────────────────────

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Assistant,
}

/// One ordered unit of chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
  pub message_id: Uuid,
  pub role:       Role,
  pub content:    String,
  /// Server-assigned timestamp; never changes after append.
  pub sent_at:    DateTime<Utc>,
  /// Raw agent response payload, retained for audit and display.
  pub payload:    Option<serde_json::Value>,
  pub approval:   Option<PendingApproval>,
}

// ─── Conversation ────────────────────────────────────────────────────────────

/// The append-only message log for one conversation.
#[derive(Debug, Default)]
pub struct Conversation {
  messages: Vec<Message>,
}

impl Conversation {
  pub fn new() -> Self { Self::default() }

  /// Append a plain message and return a clone of it.
  pub fn append(&mut self, role: Role, content: impl Into<String>) -> Message {
    self.append_full(role, content, None, None)
  }

  /// Append a message carrying an agent payload and/or a pending approval.
  pub fn append_full(
    &mut self,
    role: Role,
    content: impl Into<String>,
    payload: Option<serde_json::Value>,
    approval: Option<PendingApproval>,
  ) -> Message {
    let message = Message {
      message_id: Uuid::new_v4(),
      role,
      content: content.into(),
      sent_at: Utc::now(),
      payload,
      approval,
    };
    self.messages.push(message.clone());
    message
  }

  pub fn messages(&self) -> &[Message] { &self.messages }

  pub fn len(&self) -> usize { self.messages.len() }

  pub fn is_empty(&self) -> bool { self.messages.is_empty() }

  pub fn message(&self, id: Uuid) -> Option<&Message> {
    self.messages.iter().find(|m| m.message_id == id)
  }

  /// The pending approval attached to `id`, if any.
  pub fn approval(&self, id: Uuid) -> Option<&PendingApproval> {
    self.message(id).and_then(|m| m.approval.as_ref())
  }

  /// Clear and return the approval on `id`. `None` when the message does
  /// not exist or holds no approval — callers treat that as a stale action.
  pub fn clear_approval(&mut self, id: Uuid) -> Option<PendingApproval> {
    self.message_mut(id).and_then(|m| m.approval.take())
  }

  /// Mark the approval on `id` as having an agent round trip outstanding
  /// and return a snapshot to build the request from. `None` when there is
  /// no approval.
  pub fn begin_round_trip(&mut self, id: Uuid) -> Option<PendingApproval> {
    let approval = self.message_mut(id)?.approval.as_mut()?;
    approval.in_flight = true;
    Some(approval.clone())
  }

  /// Clear the in-flight marker after a round trip settles without
  /// advancing the phase (the failure path). Returns false when the
  /// approval is gone.
  pub fn end_round_trip(&mut self, id: Uuid) -> bool {
    match self.message_mut(id).and_then(|m| m.approval.as_mut()) {
      Some(approval) => {
        approval.in_flight = false;
        true
      }
      None => false,
    }
  }

  /// Replace the approval on `id` with `next`, which must sit strictly
  /// further along the pipeline. Returns false (log untouched) when there
  /// is no approval or `next` would not move the phase forward.
  pub fn advance_approval(&mut self, id: Uuid, next: PendingApproval) -> bool {
    match self.message_mut(id).and_then(|m| m.approval.as_mut()) {
      Some(approval) if next.phase > approval.phase => {
        *approval = next;
        true
      }
      _ => false,
    }
  }

  fn message_mut(&mut self, id: Uuid) -> Option<&mut Message> {
    self.messages.iter_mut().find(|m| m.message_id == id)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
