//! The `Agent` trait and the canonical reply type.
//!
//! The external AI agent is a black box reached over the network. This
//! module defines the transport-free interface the workflow consumes and the
//! single normalized shape every response is reduced to before any workflow
//! logic runs — shape detection happens in the client, never in the
//! orchestrator.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{breach::Breach, rule::Rule};

// ─── Canonical reply ─────────────────────────────────────────────────────────

/// A validation-side review note the agent wants a human to look at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguityFlag {
  pub issue:          String,
  pub recommendation: String,
}

/// The canonical form of any agent response, whatever shape it arrived in.
///
/// `rules` is `Some` exactly when the payload matched the extraction-result
/// shape: `Some(vec![])` (extraction shape, zero rules) and `None` (no
/// extraction shape at all) are distinct, and the distinction decides
/// whether a freeform reply spawns a pending approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReply {
  pub message:  Option<String>,
  pub rules:    Option<Vec<Rule>>,
  /// Compliance score in [0, 100].
  pub score:    Option<u8>,
  pub breaches: Vec<Breach>,
  pub flags:    Vec<AmbiguityFlag>,
  /// The payload as received, retained on the conversation log.
  pub raw:      serde_json::Value,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the external AI agent service.
///
/// An `Err` covers both transport failures and non-success agent statuses;
/// callers treat the two identically. All methods return `Send` futures so
/// the trait can be used in multi-threaded async runtimes.
pub trait Agent: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Upload a document, returning the asset references to attach to the
  /// subsequent extraction request.
  fn upload<'a>(
    &'a self,
    filename: &'a str,
    contents: Vec<u8>,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'a;

  /// Request rule extraction only — the request explicitly instructs the
  /// agent not to validate against the portfolio yet.
  fn extract_rules<'a>(
    &'a self,
    filename: &'a str,
    assets: &'a [String],
  ) -> impl Future<Output = Result<AgentReply, Self::Error>> + Send + 'a;

  /// Request portfolio validation of previously extracted rules.
  fn validate_rules<'a>(
    &'a self,
    rules: &'a [Rule],
  ) -> impl Future<Output = Result<AgentReply, Self::Error>> + Send + 'a;

  /// Send arbitrary user text.
  fn answer<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Result<AgentReply, Self::Error>> + Send + 'a;
}
