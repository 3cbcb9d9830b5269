//! Handlers for the conversational workflow endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/documents` | Multipart; first field with a filename wins |
//! | `POST` | `/queries` | Body: `{"text":"..."}` |
//! | `POST` | `/messages/{id}/approve` | Send extracted rules to validation |
//! | `POST` | `/messages/{id}/commit` | Commit validated rules as a version |
//! | `POST` | `/messages/{id}/discard` | Abandon the pending rules |
//! | `GET`  | `/conversation` | Full message log, in append order |
//!
//! Agent failures never surface as HTTP errors here: the workflow records
//! them as assistant-authored notices, and the handler returns that message
//! with a `200`. Stale review actions come back as an `ignored` outcome, not
//! a `4xx`.

use axum::{
  Json,
  extract::{Multipart, Path, State},
};
use mandate_core::{
  agent::Agent, conversation::Message, store::VersionStore,
};
use mandate_workflow::Outcome;
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Documents ────────────────────────────────────────────────────────────────

/// `POST /documents` — upload one guideline document for rule extraction.
pub async fn submit_document<S, A>(
  State(state): State<AppState<S, A>>,
  mut multipart: Multipart,
) -> Result<Json<Message>, ApiError>
where
  S: VersionStore,
  A: Agent,
{
  let mut file: Option<(String, Vec<u8>)> = None;
  while let Some(field) = multipart.next_field().await.map_err(|e| {
    ApiError::BadRequest(format!("malformed multipart body: {e}"))
  })? {
    if let Some(filename) = field.file_name().map(str::to_owned) {
      let contents = field.bytes().await.map_err(|e| {
        ApiError::BadRequest(format!("unreadable file field: {e}"))
      })?;
      file = Some((filename, contents.to_vec()));
      break;
    }
  }
  let (filename, contents) =
    file.ok_or_else(|| ApiError::BadRequest("no file attached".to_string()))?;

  Ok(Json(state.workflow.submit_document(&filename, contents).await))
}

// ─── Queries ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct QueryBody {
  pub text: String,
}

/// `POST /queries` — body: `{"text":"..."}`
pub async fn submit_query<S, A>(
  State(state): State<AppState<S, A>>,
  Json(body): Json<QueryBody>,
) -> Result<Json<Message>, ApiError>
where
  S: VersionStore,
  A: Agent,
{
  if body.text.trim().is_empty() {
    return Err(ApiError::BadRequest("text must not be empty".to_string()));
  }
  Ok(Json(state.workflow.submit_query(&body.text).await))
}

// ─── Review actions ───────────────────────────────────────────────────────────

/// `POST /messages/{id}/approve`
pub async fn approve<S, A>(
  State(state): State<AppState<S, A>>,
  Path(id): Path<Uuid>,
) -> Json<Outcome>
where
  S: VersionStore,
  A: Agent,
{
  Json(state.workflow.approve_for_validation(id).await)
}

/// `POST /messages/{id}/commit`
pub async fn commit<S, A>(
  State(state): State<AppState<S, A>>,
  Path(id): Path<Uuid>,
) -> Json<Outcome>
where
  S: VersionStore,
  A: Agent,
{
  Json(state.workflow.commit(id).await)
}

/// `POST /messages/{id}/discard`
pub async fn discard<S, A>(
  State(state): State<AppState<S, A>>,
  Path(id): Path<Uuid>,
) -> Json<Outcome>
where
  S: VersionStore,
  A: Agent,
{
  Json(state.workflow.discard(id).await)
}

// ─── Conversation ─────────────────────────────────────────────────────────────

/// `GET /conversation`
pub async fn conversation<S, A>(
  State(state): State<AppState<S, A>>,
) -> Json<Vec<Message>>
where
  S: VersionStore,
  A: Agent,
{
  Json(state.workflow.conversation().await)
}
