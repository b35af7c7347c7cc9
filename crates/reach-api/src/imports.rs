//! Handlers for `/imports` — batch ingestion endpoints.
//!
//! Row-level problems come back inside the [`ImportReport`]; only a storage
//! failure (whole batch rolled back) surfaces as an error status.

use axum::{Json, extract::State};
use reach_core::{
  import::{ContactRow, ImportLog, ImportReport, TargetRow},
  mailer::Mailer,
  store::OutreachStore,
  target::TargetKind,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct TargetBatch {
  pub rows: Vec<TargetRow>,
  /// Kind for rows that do not carry their own `type` column.
  #[serde(default = "default_kind")]
  pub kind: TargetKind,
}

fn default_kind() -> TargetKind { TargetKind::Employer }

/// `POST /imports/targets` — body: `{"rows": [...], "kind": "municipality"}`
pub async fn import_targets<S, M>(
  State(state): State<AppState<S, M>>,
  Json(batch): Json<TargetBatch>,
) -> Result<Json<ImportReport>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let report = state.importer.import_targets(batch.rows, batch.kind).await?;
  Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct ContactBatch {
  pub rows: Vec<ContactRow>,
}

/// `POST /imports/contacts` — body: `{"rows": [...]}`
pub async fn import_contacts<S, M>(
  State(state): State<AppState<S, M>>,
  Json(batch): Json<ContactBatch>,
) -> Result<Json<ImportReport>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let report = state.importer.import_contacts(batch.rows).await?;
  Ok(Json(report))
}

/// `GET /imports` — audit log, newest first.
pub async fn list_logs<S, M>(
  State(state): State<AppState<S, M>>,
) -> Result<Json<Vec<ImportLog>>, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let logs = state.store.list_import_logs().await.map_err(ApiError::store)?;
  Ok(Json(logs))
}
