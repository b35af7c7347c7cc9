//! Pipeline status policy — the deterministic mapping from recorded outcomes
//! to [`TargetStatus`](crate::target::TargetStatus).
//!
//! Manual `won` is never overridden automatically. Whether `lost` can be
//! reopened by later engagement is a deliberate policy choice kept in its own
//! function so it can be swapped without touching the engine.

use crate::{outreach::Outcome, target::TargetStatus};

/// The status a `lost` target reopens into on fresh engagement, if any.
///
/// Policy: a reply or a booked meeting pulls the target back into the active
/// pipeline; anything weaker leaves it lost.
pub fn reopened_status(outcome: Outcome) -> Option<TargetStatus> {
  match outcome {
    Outcome::Reply => Some(TargetStatus::Replied),
    Outcome::MeetingSet => Some(TargetStatus::Meeting),
    _ => None,
  }
}

/// Compute the status a target should move to after `outcome` is recorded.
///
/// `first_event` is true when this is the first outreach event the target has
/// ever had. Returns `None` when no automatic transition applies — including
/// whenever the target is manually `won`.
pub fn next_status(
  current: TargetStatus,
  outcome: Outcome,
  first_event: bool,
) -> Option<TargetStatus> {
  // Manual terminal wins over every automatic transition.
  if current == TargetStatus::Won {
    return None;
  }

  if current == TargetStatus::Lost {
    return reopened_status(outcome);
  }

  let next = match outcome {
    Outcome::Reply => Some(TargetStatus::Replied),
    Outcome::MeetingSet => Some(TargetStatus::Meeting),
    Outcome::Rejected => Some(TargetStatus::Lost),
    Outcome::None | Outcome::NoReply => {
      (first_event && current == TargetStatus::New)
        .then_some(TargetStatus::Contacted)
    }
  };

  next.filter(|n| *n != current)
}
