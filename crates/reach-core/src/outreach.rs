//! Outreach events — the append-only ledger of contact attempts.
//!
//! Events are never deleted. The only field written after creation is
//! `outcome`, recorded when the other side responds (or doesn't); outcome
//! changes feed the pipeline updater.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// The medium an outreach attempt went through.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
  Email,
  Linkedin,
  Phone,
}

/// What came back from an outreach attempt. `none` means no outcome has been
/// recorded yet.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
  None,
  NoReply,
  Reply,
  MeetingSet,
  Rejected,
}

/// One attempt to reach a target (optionally through a specific contact).
///
/// `message_id` holds the transport message id for live sends, or the
/// synthetic preview marker for simulated ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachEvent {
  pub event_id:   Uuid,
  pub target_id:  Uuid,
  pub contact_id: Option<Uuid>,
  pub channel:    Channel,
  pub subject:    Option<String>,
  pub body:       String,
  pub outcome:    Outcome,
  pub message_id: Option<String>,
  pub sent_at:    DateTime<Utc>,
}

/// Input to [`crate::store::OutreachStore::record_event`].
/// `sent_at` is always set by the store; it is not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub target_id:  Uuid,
  pub contact_id: Option<Uuid>,
  pub channel:    Channel,
  pub subject:    Option<String>,
  pub body:       String,
  pub outcome:    Outcome,
  pub message_id: Option<String>,
}

impl NewEvent {
  /// An event with no recorded outcome yet.
  pub fn new(target_id: Uuid, channel: Channel, body: impl Into<String>) -> Self {
    Self {
      target_id,
      contact_id: None,
      channel,
      subject: None,
      body: body.into(),
      outcome: Outcome::None,
      message_id: None,
    }
  }
}
