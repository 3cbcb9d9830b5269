//! The result of a workflow action.

use mandate_core::{approval::IgnoreReason, conversation::Message};
use serde::Serialize;

/// What a workflow action did.
///
/// Stale actions are reported, never errored: a UI firing the same button
/// twice is expected traffic, not a fault.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
  /// The action ran; this is the assistant message it appended.
  Reply { message: Message },
  /// The action referenced a missing or stale approval and was dropped
  /// without touching the conversation or the store.
  Ignored { reason: IgnoreReason },
}

impl Outcome {
  pub fn is_ignored(&self) -> bool { matches!(self, Self::Ignored { .. }) }
}
