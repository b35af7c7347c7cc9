//! Handlers for `/dnc` — the do-not-contact registry.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use reach_core::{dnc::DncEntry, mailer::Mailer, store::OutreachStore};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// `GET /dnc`
pub async fn list<S, M>(
  State(state): State<AppState<S, M>>,
) -> Result<Json<Vec<DncEntry>>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let entries = state.store.list_dnc_entries().await.map_err(ApiError::store)?;
  Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
pub struct DncBody {
  pub email:  String,
  pub reason: Option<String>,
}

/// `POST /dnc` — body: `{"email": "...", "reason": "..."}`
pub async fn create<S, M>(
  State(state): State<AppState<S, M>>,
  Json(body): Json<DncBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  if body.email.trim().is_empty() {
    return Err(ApiError::BadRequest("email must not be empty".into()));
  }
  let entry = state
    .store
    .add_dnc_entry(&body.email, body.reason)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(entry)))
}
