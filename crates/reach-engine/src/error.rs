//! Engine error types.
//!
//! Row-level import problems never surface here — they are folded into the
//! [`ImportReport`](reach_core::import::ImportReport) as counts and messages.
//! These types carry the operation-level failures that abort a batch or a
//! single send attempt.

use reach_core::{draft::DraftState, mailer::TransportError};
use thiserror::Error;
use uuid::Uuid;

/// Boxed storage error; the engine is generic over the backend's error type.
type BoxedStorage = Box<dyn std::error::Error + Send + Sync>;

/// A whole import batch failed. The batch has been rolled back and an
/// all-failed audit row recorded.
#[derive(Debug, Error)]
pub enum ImportError {
  #[error("storage error: {0}")]
  Storage(#[source] BoxedStorage),
}

/// Why a send attempt did not produce a sent draft. All variants are terminal
/// for the attempt only; resubmission is the caller's decision.
#[derive(Debug, Error)]
pub enum SendError {
  #[error("draft not found: {0}")]
  DraftNotFound(Uuid),

  #[error("target not found: {0}")]
  TargetNotFound(Uuid),

  #[error("draft {0} is {1}; only approved drafts can be sent")]
  NotApproved(Uuid, DraftState),

  /// The draft is not in the state the requested transition starts from.
  #[error("draft {draft_id} is {from}; cannot move to {to}")]
  InvalidTransition {
    draft_id: Uuid,
    from:     DraftState,
    to:       DraftState,
  },

  #[error("draft {0} is {1}; subject/body are only editable in draft state")]
  NotEditable(Uuid, DraftState),

  #[error("draft {0} has no recipient email")]
  NoRecipient(Uuid),

  /// The recipient is on the do-not-contact list. The draft stays approved.
  #[error("recipient {0} is on the do-not-contact list")]
  SuppressionBlocked(String),

  /// The daily cap is consumed; retry another day.
  #[error("daily send limit of {limit} reached")]
  RateLimitExceeded { limit: u32 },

  #[error(transparent)]
  Transport(#[from] TransportError),

  #[error("storage error: {0}")]
  Storage(#[source] BoxedStorage),
}

impl SendError {
  pub(crate) fn storage<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(e))
  }
}

impl ImportError {
  pub(crate) fn storage<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(e))
  }
}
