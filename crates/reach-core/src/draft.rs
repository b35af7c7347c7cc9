//! Outreach drafts and their state machine.
//!
//! A draft moves `draft → approved → {sent, failed}`, with `draft → rejected`
//! as a terminal branch and `failed → approved` as the explicit resubmission
//! path. The transition table lives here so illegal moves are checkable
//! before any storage write; the store additionally conditions each
//! transition on the expected current state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Workflow state of an outreach draft.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DraftState {
  Draft,
  Approved,
  Sent,
  Rejected,
  Failed,
}

impl DraftState {
  /// The complete transition table. Everything not listed is illegal —
  /// in particular there is no path from `draft` to `sent` that skips
  /// `approved`.
  pub fn can_transition(self, to: DraftState) -> bool {
    matches!(
      (self, to),
      (Self::Draft, Self::Approved)
        | (Self::Draft, Self::Rejected)
        | (Self::Approved, Self::Sent)
        | (Self::Approved, Self::Failed)
        | (Self::Failed, Self::Approved)
    )
  }

  /// `sent` and `rejected` admit no further transitions.
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Sent | Self::Rejected)
  }

  /// Subject/body are mutable only before approval.
  pub fn is_editable(self) -> bool { matches!(self, Self::Draft) }
}

/// A message being prepared for a target. Mutable only through the draft
/// workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachDraft {
  pub draft_id:   Uuid,
  pub target_id:  Uuid,
  pub contact_id: Option<Uuid>,
  pub subject:    String,
  pub body:       String,
  pub state:      DraftState,
  pub created_at: DateTime<Utc>,
  pub updated_at: Option<DateTime<Utc>>,
}

/// Input to [`crate::store::OutreachStore::add_draft`]. Drafts always start
/// in [`DraftState::Draft`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewDraft {
  pub target_id:  Uuid,
  pub contact_id: Option<Uuid>,
  pub subject:    String,
  pub body:       String,
}

#[cfg(test)]
mod tests {
  use super::DraftState::*;

  #[test]
  fn legal_transitions() {
    assert!(Draft.can_transition(Approved));
    assert!(Draft.can_transition(Rejected));
    assert!(Approved.can_transition(Sent));
    assert!(Approved.can_transition(Failed));
    assert!(Failed.can_transition(Approved));
  }

  #[test]
  fn no_path_skips_approval() {
    assert!(!Draft.can_transition(Sent));
    assert!(!Draft.can_transition(Failed));
    assert!(!Failed.can_transition(Sent));
  }

  #[test]
  fn terminal_states_admit_nothing() {
    for to in [Draft, Approved, Sent, Rejected, Failed] {
      assert!(!Sent.can_transition(to));
      assert!(!Rejected.can_transition(to));
    }
  }
}
