//! Pipeline updater — applies the status policy from
//! [`reach_core::pipeline`] to stored targets.
//!
//! Status writes are compare-and-set against the status read at decision
//! time; losing the race to a concurrent (possibly manual) change means the
//! automatic transition is dropped, never forced.

use std::sync::Arc;

use reach_core::{
  outreach::{Outcome, OutreachEvent},
  pipeline::next_status,
  store::OutreachStore,
  target::{Target, TargetStatus},
};
use uuid::Uuid;

use crate::error::SendError;

pub struct PipelineUpdater<S> {
  store: Arc<S>,
}

impl<S: OutreachStore> PipelineUpdater<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Advance `target` after `outcome` was recorded for it. Returns the new
  /// status, or `None` when no transition applied (including lost races).
  pub async fn on_event(
    &self,
    target: &Target,
    outcome: Outcome,
    first_event: bool,
  ) -> Result<Option<TargetStatus>, SendError> {
    let Some(next) = next_status(target.status, outcome, first_event) else {
      return Ok(None);
    };

    let moved = self
      .store
      .compare_and_set_status(target.target_id, target.status, next)
      .await
      .map_err(SendError::storage)?;

    if moved {
      tracing::info!(
        target = %target.target_id,
        from = %target.status,
        to = %next,
        "pipeline status advanced"
      );
      Ok(Some(next))
    } else {
      tracing::warn!(
        target = %target.target_id,
        "target status changed concurrently; automatic transition dropped"
      );
      Ok(None)
    }
  }

  /// Record an outcome on an existing event and advance the owning target.
  pub async fn record_outcome(
    &self,
    event_id: Uuid,
    outcome: Outcome,
  ) -> Result<OutreachEvent, SendError> {
    let event = self
      .store
      .set_event_outcome(event_id, outcome)
      .await
      .map_err(SendError::storage)?;

    let target = self
      .store
      .get_target(event.target_id)
      .await
      .map_err(SendError::storage)?
      .ok_or(SendError::TargetNotFound(event.target_id))?;

    // The event exists, so this is never the target's first one.
    self.on_event(&target, outcome, false).await?;
    Ok(event)
  }
}
