//! CSV export of targets with the computed `last_contacted` column.

use reach_core::store::OutreachStore;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Write all targets as CSV. `last_contacted` is `max(sent_at)` over the
/// target's outreach events, or empty when it has none.
pub async fn export_targets_csv<S, W>(store: &S, out: W) -> Result<(), ExportError>
where
  S: OutreachStore,
  W: std::io::Write,
{
  let rows = store
    .targets_with_last_contacted()
    .await
    .map_err(|e| ExportError::Storage(Box::new(e)))?;

  let mut writer = csv::Writer::from_writer(out);
  writer.write_record([
    "id",
    "name",
    "type",
    "sector",
    "website",
    "status",
    "last_contacted",
  ])?;

  for (target, last_contacted) in rows {
    writer.write_record([
      target.target_id.to_string(),
      target.name.clone(),
      target.kind.to_string(),
      target.sector.clone().unwrap_or_default(),
      target.website.clone().unwrap_or_default(),
      target.status.to_string(),
      last_contacted.map(|dt| dt.to_rfc3339()).unwrap_or_default(),
    ])?;
  }

  writer.flush().map_err(csv::Error::from)?;
  Ok(())
}
