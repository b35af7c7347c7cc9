//! Error types for `reach-core`.
//!
//! Domain rule violations live here; storage backends wrap them alongside
//! their own infrastructure errors.

use thiserror::Error;
use uuid::Uuid;

use crate::draft::DraftState;

#[derive(Debug, Error)]
pub enum Error {
  #[error("target not found: {0}")]
  TargetNotFound(Uuid),

  #[error("contact not found: {0}")]
  ContactNotFound(Uuid),

  #[error("draft not found: {0}")]
  DraftNotFound(Uuid),

  #[error("outreach event not found: {0}")]
  EventNotFound(Uuid),

  #[error("follow-up not found: {0}")]
  FollowUpNotFound(Uuid),

  /// A contact insert referenced a target that does not exist.
  #[error("contact references missing target: {0}")]
  OrphanContact(Uuid),

  /// The requested move is not in the draft transition table.
  #[error("invalid draft transition: {from} -> {to}")]
  InvalidTransition { from: DraftState, to: DraftState },

  /// A conditional transition lost a race: the stored state was no longer
  /// the expected one.
  #[error("draft {draft_id} is {actual}, expected {expected}")]
  StateConflict {
    draft_id: Uuid,
    expected: DraftState,
    actual:   DraftState,
  },

  #[error("draft {0} is {1}; subject/body are only editable in draft state")]
  DraftImmutable(Uuid, DraftState),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
