//! Suppression guard — the do-not-contact check in front of every send.

use std::sync::Arc;

use reach_core::store::OutreachStore;

use crate::error::SendError;

/// Wraps the store's DNC registry with the check the workflow runs
/// immediately before any send attempt.
pub struct SuppressionGuard<S> {
  store: Arc<S>,
}

impl<S: OutreachStore> SuppressionGuard<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Whether `email` is on the do-not-contact list (case-insensitive).
  pub async fn is_suppressed(&self, email: &str) -> Result<bool, SendError> {
    self.store.is_suppressed(email).await.map_err(SendError::storage)
  }

  /// Fail with [`SendError::SuppressionBlocked`] when `email` is suppressed.
  /// Fatal to this attempt only; the caller's draft state is untouched.
  pub async fn check(&self, email: &str) -> Result<(), SendError> {
    if self.is_suppressed(email).await? {
      tracing::info!(recipient = %email, "send blocked by do-not-contact entry");
      return Err(SendError::SuppressionBlocked(email.to_owned()));
    }
    Ok(())
  }
}
