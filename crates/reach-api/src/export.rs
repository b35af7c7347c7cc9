//! Handler for `/export/targets` — CSV download with `last_contacted`.

use axum::{
  extract::State,
  http::{StatusCode, header},
  response::IntoResponse,
};
use reach_core::{mailer::Mailer, store::OutreachStore};
use reach_engine::export::export_targets_csv;

use crate::{AppState, error::ApiError};

/// `GET /export/targets`
pub async fn targets_csv<S, M>(
  State(state): State<AppState<S, M>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: OutreachStore,
  M: Mailer,
{
  let mut buf = Vec::new();
  export_targets_csv(state.store.as_ref(), &mut buf)
    .await
    .map_err(ApiError::store)?;

  Ok((
    StatusCode::OK,
    [
      (header::CONTENT_TYPE, "text/csv"),
      (
        header::CONTENT_DISPOSITION,
        "attachment; filename=targets_export.csv",
      ),
    ],
    buf,
  ))
}
