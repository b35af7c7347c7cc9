//! Follow-up reminders and lead suggestions.
//!
//! Auxiliary records; their only invariant is referencing an existing target.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A dated reminder to revisit a target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUp {
  pub followup_id: Uuid,
  pub target_id:   Uuid,
  pub due_date:    NaiveDate,
  pub reason:      Option<String>,
  pub done:        bool,
}

/// Input to [`crate::store::OutreachStore::add_followup`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewFollowUp {
  pub target_id: Uuid,
  pub due_date:  NaiveDate,
  pub reason:    Option<String>,
}

/// A recorded hint that a target may be worth pursuing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadSuggestion {
  pub suggestion_id: Uuid,
  pub target_id:     Uuid,
  pub suggestion:    String,
  pub created_at:    DateTime<Utc>,
}
