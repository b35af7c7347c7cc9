//! Handlers for `/drafts` — the controlled-send surface.
//!
//! Every state change routes through the engine's workflow, so the approval
//! invariant and the suppression/rate-limit checks cannot be bypassed from
//! here.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use reach_core::{
  draft::{DraftState, NewDraft, OutreachDraft},
  mailer::Mailer,
  outreach::OutreachEvent,
  store::OutreachStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub state: Option<DraftState>,
}

/// `GET /drafts[?state=<state>]`
pub async fn list<S, M>(
  State(state): State<AppState<S, M>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<OutreachDraft>>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let drafts = state
    .store
    .list_drafts(params.state)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(drafts))
}

/// `POST /drafts`
pub async fn create<S, M>(
  State(state): State<AppState<S, M>>,
  Json(body): Json<NewDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let draft = state.workflow.create(body).await?;
  Ok((StatusCode::CREATED, Json(draft)))
}

/// `GET /drafts/:id`
pub async fn get_one<S, M>(
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<OutreachDraft>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let draft = state
    .store
    .get_draft(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("draft {id} not found")))?;
  Ok(Json(draft))
}

#[derive(Debug, Deserialize)]
pub struct ContentBody {
  pub subject: String,
  pub body:    String,
}

/// `PUT /drafts/:id` — edit subject/body; rejected once approved.
pub async fn update_content<S, M>(
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ContentBody>,
) -> Result<Json<OutreachDraft>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let draft = state.workflow.update_content(id, body.subject, body.body).await?;
  Ok(Json(draft))
}

/// `POST /drafts/:id/approve`
pub async fn approve<S, M>(
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<OutreachDraft>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let draft = state.workflow.approve(id).await?;
  Ok(Json(draft))
}

/// `POST /drafts/:id/reject` — terminal; no event is ever produced.
pub async fn reject<S, M>(
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<OutreachDraft>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let draft = state.workflow.reject(id).await?;
  Ok(Json(draft))
}

/// `POST /drafts/:id/resubmit` — the explicit `failed → approved` path.
pub async fn resubmit<S, M>(
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<OutreachDraft>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let draft = state.workflow.resubmit(id).await?;
  Ok(Json(draft))
}

/// `POST /drafts/:id/send`
pub async fn send<S, M>(
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<OutreachEvent>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let event = state.workflow.send(id).await?;
  Ok(Json(event))
}
