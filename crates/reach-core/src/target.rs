//! Target — an organization being pursued for outreach.
//!
//! A target owns its contacts, outreach events, and follow-ups. Its `status`
//! walks the pipeline and is written only by the pipeline updater or an
//! explicit manual status change — never by an import.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// The kind of organization a target represents.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TargetKind {
  Employer,
  Municipality,
}

/// The target's current stage in the outreach lifecycle.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TargetStatus {
  New,
  Contacted,
  Replied,
  Meeting,
  Won,
  Lost,
}

impl TargetStatus {
  /// `won` and `lost` end the pipeline; `lost` may still be reopened by the
  /// policy in [`crate::pipeline`].
  pub fn is_terminal(self) -> bool { matches!(self, Self::Won | Self::Lost) }
}

/// An organization row. `name` is the primary matching key for imports,
/// `website` the secondary one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
  pub target_id:     Uuid,
  pub name:          String,
  pub kind:          TargetKind,
  pub sector:        Option<String>,
  pub province:      Option<String>,
  pub website:       Option<String>,
  pub general_email: Option<String>,
  pub phone:         Option<String>,
  pub source:        Option<String>,
  pub notes:         Option<String>,
  pub status:        TargetStatus,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    Option<DateTime<Utc>>,
}

/// Input to [`crate::store::OutreachStore::add_target`].
/// Identity and timestamps are assigned by the store; status starts at `new`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTarget {
  pub name:          String,
  pub kind:          TargetKind,
  pub sector:        Option<String>,
  pub province:      Option<String>,
  pub website:       Option<String>,
  pub general_email: Option<String>,
  pub phone:         Option<String>,
  pub source:        Option<String>,
  pub notes:         Option<String>,
}

impl NewTarget {
  /// Convenience constructor with all optional fields empty.
  pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
    Self {
      name: name.into(),
      kind,
      sector: None,
      province: None,
      website: None,
      general_email: None,
      phone: None,
      source: None,
      notes: None,
    }
  }
}
