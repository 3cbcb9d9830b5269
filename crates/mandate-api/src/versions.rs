//! Handlers for `/versions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/versions` | All versions, insertion order |
//! | `GET`  | `/versions/current` | 404 while the store is empty |
//! | `GET`  | `/versions/{id}` | Numeric ordinal, not the label |
//! | `GET`  | `/versions/{old}/diff/{new}` | 404 if either side is missing |

use axum::{
  Json,
  extract::{Path, State},
};
use mandate_core::{
  agent::Agent,
  diff::{self, RuleDiff},
  store::VersionStore,
  version::{ChangeSummary, Version, VersionId},
};
use serde::Serialize;

use crate::{AppState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /versions`
pub async fn list<S, A>(
  State(state): State<AppState<S, A>>,
) -> Result<Json<Vec<Version>>, ApiError>
where
  S: VersionStore,
  A: Agent,
{
  let versions = state.store.list_versions().await.map_err(ApiError::store)?;
  Ok(Json(versions))
}

// ─── Current ──────────────────────────────────────────────────────────────────

/// `GET /versions/current`
pub async fn current<S, A>(
  State(state): State<AppState<S, A>>,
) -> Result<Json<Version>, ApiError>
where
  S: VersionStore,
  A: Agent,
{
  let version = state
    .store
    .current()
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound("no version has been committed yet".to_string())
    })?;
  Ok(Json(version))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /versions/{id}`
pub async fn get_one<S, A>(
  State(state): State<AppState<S, A>>,
  Path(id): Path<u64>,
) -> Result<Json<Version>, ApiError>
where
  S: VersionStore,
  A: Agent,
{
  Ok(Json(fetch(&state, id).await?))
}

// ─── Diff ─────────────────────────────────────────────────────────────────────

/// The classified difference between two stored versions.
#[derive(Debug, Serialize)]
pub struct DiffResponse {
  pub old:     VersionId,
  pub new:     VersionId,
  pub summary: ChangeSummary,
  #[serde(flatten)]
  pub diff:    RuleDiff,
}

/// `GET /versions/{old}/diff/{new}`
pub async fn diff_two<S, A>(
  State(state): State<AppState<S, A>>,
  Path((old, new)): Path<(u64, u64)>,
) -> Result<Json<DiffResponse>, ApiError>
where
  S: VersionStore,
  A: Agent,
{
  let old_version = fetch(&state, old).await?;
  let new_version = fetch(&state, new).await?;
  let diff = diff::diff(&old_version.rules, &new_version.rules);
  Ok(Json(DiffResponse {
    old:     old_version.version_id,
    new:     new_version.version_id,
    summary: diff.summary(),
    diff,
  }))
}

async fn fetch<S, A>(
  state: &AppState<S, A>,
  id: u64,
) -> Result<Version, ApiError>
where
  S: VersionStore,
  A: Agent,
{
  state
    .store
    .get_version(VersionId(id))
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("version v{id} not found")))
}
