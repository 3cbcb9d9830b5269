//! JSON REST API for Mandate.
//!
//! Exposes an axum [`Router`] wiring the workflow orchestrator and the
//! version store behind a small JSON surface: a conversational side
//! (documents, queries, review actions) and a read-only version-history
//! side. Auth, TLS, and transport concerns are the caller's responsibility.

pub mod chat;
pub mod error;
pub mod versions;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use mandate_agent::AgentConfig;
use mandate_core::{agent::Agent, store::VersionStore};
use mandate_workflow::Workflow;
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub agent:      AgentConfig,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
///
/// The version endpoints read the store directly; everything conversational
/// goes through the workflow, which serializes writes internally.
#[derive(Clone)]
pub struct AppState<S, A> {
  pub workflow: Arc<Workflow<S, A>>,
  pub store:    Arc<S>,
}

impl<S, A> AppState<S, A>
where
  S: VersionStore,
  A: Agent,
{
  /// Build state sharing one store handle between the workflow and the
  /// read-only version endpoints.
  pub fn new(store: Arc<S>, agent: A) -> Self {
    Self {
      workflow: Arc::new(Workflow::new(store.clone(), agent)),
      store,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full API router for `state`.
pub fn router<S, A>(state: AppState<S, A>) -> Router
where
  S: VersionStore + Clone + Send + Sync + 'static,
  A: Agent + Clone + Send + Sync + 'static,
{
  Router::new()
    // Conversation
    .route("/documents", post(chat::submit_document::<S, A>))
    .route("/queries", post(chat::submit_query::<S, A>))
    .route("/messages/{id}/approve", post(chat::approve::<S, A>))
    .route("/messages/{id}/commit", post(chat::commit::<S, A>))
    .route("/messages/{id}/discard", post(chat::discard::<S, A>))
    .route("/conversation", get(chat::conversation::<S, A>))
    // Versions
    .route("/versions", get(versions::list::<S, A>))
    .route("/versions/current", get(versions::current::<S, A>))
    .route("/versions/{id}", get(versions::get_one::<S, A>))
    .route("/versions/{old}/diff/{new}", get(versions::diff_two::<S, A>))
    .with_state(state)
}
