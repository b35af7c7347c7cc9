//! Handlers for `/targets` and follow-up endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/targets` | Optional `?kind=` and `?status=` filters |
//! | `POST` | `/targets` | Body: a `NewTarget` |
//! | `GET`  | `/targets/:id` | 404 if not found |
//! | `POST` | `/targets/:id/status` | Manual pipeline override |
//! | `GET/POST` | `/targets/:id/contacts` | |
//! | `GET`  | `/targets/:id/events` | Newest first |
//! | `GET/POST` | `/targets/:id/followups`, `POST /followups/:id/done` | |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use reach_core::{
  contact::{Contact, NewContact},
  followup::{FollowUp, NewFollowUp},
  mailer::Mailer,
  outreach::OutreachEvent,
  store::{OutreachStore, TargetFilter},
  target::{NewTarget, Target, TargetKind, TargetStatus},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── List / create / get ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub kind:   Option<TargetKind>,
  pub status: Option<TargetStatus>,
}

/// `GET /targets[?kind=<kind>][&status=<status>]`
pub async fn list<S, M>(
  State(state): State<AppState<S, M>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Target>>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let targets = state
    .store
    .list_targets(TargetFilter { kind: params.kind, status: params.status })
    .await
    .map_err(ApiError::store)?;
  Ok(Json(targets))
}

/// `POST /targets`
pub async fn create<S, M>(
  State(state): State<AppState<S, M>>,
  Json(body): Json<NewTarget>,
) -> Result<impl IntoResponse, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("target name must not be empty".into()));
  }
  let target = state.store.add_target(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(target)))
}

/// `GET /targets/:id`
pub async fn get_one<S, M>(
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Target>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let target = state
    .store
    .get_target(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("target {id} not found")))?;
  Ok(Json(target))
}

// ─── Manual status ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: TargetStatus,
}

/// `POST /targets/:id/status` — manual override; takes precedence over
/// automatic transitions, which never undo `won`.
pub async fn set_status<S, M>(
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Target>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let target = state
    .store
    .set_target_status(id, body.status)
    .await
    .map_err(|e| ApiError::NotFound(e.to_string()))?;
  Ok(Json(target))
}

// ─── Contacts ─────────────────────────────────────────────────────────────────

/// `GET /targets/:id/contacts`
pub async fn list_contacts<S, M>(
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Contact>>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let contacts =
    state.store.list_contacts(id).await.map_err(ApiError::store)?;
  Ok(Json(contacts))
}

#[derive(Debug, Deserialize)]
pub struct ContactBody {
  pub full_name:    String,
  pub role:         Option<String>,
  pub email:        Option<String>,
  pub phone:        Option<String>,
  pub linkedin_url: Option<String>,
}

/// `POST /targets/:id/contacts`
pub async fn add_contact<S, M>(
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ContactBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let contact = state
    .store
    .add_contact(NewContact {
      target_id:    id,
      full_name:    body.full_name,
      role:         body.role,
      role_en:      None,
      email:        body.email,
      phone:        body.phone,
      linkedin_url: body.linkedin_url,
    })
    .await
    .map_err(|e| ApiError::NotFound(e.to_string()))?;
  Ok((StatusCode::CREATED, Json(contact)))
}

// ─── Events ───────────────────────────────────────────────────────────────────

/// `GET /targets/:id/events`
pub async fn list_events<S, M>(
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<OutreachEvent>>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let events = state.store.list_events(id).await.map_err(ApiError::store)?;
  Ok(Json(events))
}

// ─── Follow-ups ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FollowUpBody {
  pub due_date: NaiveDate,
  pub reason:   Option<String>,
}

/// `POST /targets/:id/followups`
pub async fn add_followup<S, M>(
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
  Json(body): Json<FollowUpBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let followup = state
    .store
    .add_followup(NewFollowUp {
      target_id: id,
      due_date:  body.due_date,
      reason:    body.reason,
    })
    .await
    .map_err(|e| ApiError::NotFound(e.to_string()))?;
  Ok((StatusCode::CREATED, Json(followup)))
}

/// `GET /targets/:id/followups`
pub async fn list_followups<S, M>(
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<FollowUp>>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let followups =
    state.store.list_followups(id).await.map_err(ApiError::store)?;
  Ok(Json(followups))
}

/// `POST /followups/:id/done`
pub async fn followup_done<S, M>(
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
) -> Result<Json<FollowUp>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let followup = state
    .store
    .mark_followup_done(id)
    .await
    .map_err(|e| ApiError::NotFound(e.to_string()))?;
  Ok(Json(followup))
}
