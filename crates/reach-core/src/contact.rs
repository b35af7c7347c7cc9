//! Contact — a person associated with a target, plus the confidence scorer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// How complete a contact's data is for outreach purposes.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Confidence {
  High,
  Medium,
  Low,
}

/// Score a contact's data completeness from its email and role.
///
/// `high` iff both email and role are non-empty after trimming, `medium` iff
/// only the email is, `low` otherwise. Pure; recomputed whenever either field
/// changes.
pub fn confidence_for(email: Option<&str>, role: Option<&str>) -> Confidence {
  let has_email = email.is_some_and(|e| !e.trim().is_empty());
  let has_role = role.is_some_and(|r| !r.trim().is_empty());
  match (has_email, has_role) {
    (true, true) => Confidence::High,
    (true, false) => Confidence::Medium,
    _ => Confidence::Low,
  }
}

/// A person at a target. `target_id` must reference an existing target;
/// orphan contacts are rejected at the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
  pub contact_id:   Uuid,
  pub target_id:    Uuid,
  pub full_name:    String,
  pub role:         Option<String>,
  /// English rendering of `role` when a translation is known.
  pub role_en:      Option<String>,
  pub email:        Option<String>,
  pub phone:        Option<String>,
  pub linkedin_url: Option<String>,
  pub confidence:   Confidence,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   Option<DateTime<Utc>>,
}

/// Input to [`crate::store::OutreachStore::add_contact`].
/// The confidence score is computed by the caller via [`confidence_for`];
/// identity and timestamps are assigned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContact {
  pub target_id:    Uuid,
  pub full_name:    String,
  pub role:         Option<String>,
  pub role_en:      Option<String>,
  pub email:        Option<String>,
  pub phone:        Option<String>,
  pub linkedin_url: Option<String>,
}

impl NewContact {
  pub fn new(target_id: Uuid, full_name: impl Into<String>) -> Self {
    Self {
      target_id,
      full_name: full_name.into(),
      role: None,
      role_en: None,
      email: None,
      phone: None,
      linkedin_url: None,
    }
  }

  /// The confidence this contact will carry once stored.
  pub fn confidence(&self) -> Confidence {
    confidence_for(self.email.as_deref(), self.role.as_deref())
  }
}
