//! The approval workflow orchestrator.
//!
//! Sequences the two-phase pipeline (extract, validate, commit or discard)
//! over an [`mandate_core::agent::Agent`] and a
//! [`mandate_core::store::VersionStore`], tracking per-message approval
//! state on the conversation log. Agent failures and stale user actions are
//! absorbed here: every operation settles the conversation into a usable
//! state, so callers never see an error for anything the user did.

mod outcome;
mod workflow;

pub use outcome::Outcome;
pub use workflow::Workflow;
