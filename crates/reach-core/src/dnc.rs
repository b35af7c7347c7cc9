//! Do-not-contact registry entries.
//!
//! Presence of a matching email (compared case-insensitively) is an absolute
//! send blocker. The store keeps addresses lowercased so lookups are a plain
//! equality check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One suppressed email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DncEntry {
  pub dnc_id:     Uuid,
  pub email:      String,
  pub reason:     Option<String>,
  pub created_at: DateTime<Utc>,
}
