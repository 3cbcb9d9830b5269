//! HTTP client for the external compliance agent.
//!
//! Implements [`mandate_core::agent::Agent`] over the agent service's JSON
//! API, and normalizes the service's polymorphic response payloads into the
//! canonical [`mandate_core::agent::AgentReply`] shape. Nothing outside this
//! crate ever inspects a raw agent payload.

mod http;
pub mod normalize;
pub mod prompt;

pub mod error;

pub use error::{Error, Result};
pub use http::{AgentConfig, HttpAgent};
