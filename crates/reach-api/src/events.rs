//! Handlers for `/events` — outcome recording.
//!
//! Recording an outcome is the signal feed for the pipeline updater: the
//! owning target's status advances as a side effect.

use axum::{
  Json,
  extract::{Path, State},
};
use reach_core::{
  mailer::Mailer,
  outreach::{Outcome, OutreachEvent},
  store::OutreachStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct OutcomeBody {
  pub outcome: Outcome,
}

/// `POST /events/:id/outcome` — body: `{"outcome": "meeting_set"}`
pub async fn record_outcome<S, M>(
  State(state): State<AppState<S, M>>,
  Path(id): Path<Uuid>,
  Json(body): Json<OutcomeBody>,
) -> Result<Json<OutreachEvent>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let event = state
    .workflow
    .pipeline()
    .record_outcome(id, body.outcome)
    .await?;
  Ok(Json(event))
}
