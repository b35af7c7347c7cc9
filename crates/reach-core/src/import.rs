//! Import batch types: incoming rows, the per-batch plan handed to the
//! store, and the audit record.
//!
//! The upsert engine (in `reach-engine`) turns raw rows into an
//! [`ImportPlan`]; the store applies one plan per transaction and persists
//! exactly one [`ImportLog`] row per batch, even when every row failed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{
  contact::Contact,
  target::{Target, TargetKind},
};

// ─── Incoming rows ───────────────────────────────────────────────────────────

/// A raw target row as it arrives from a CSV file or API batch. Everything is
/// optional; the matcher decides what is fatal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetRow {
  pub name:          Option<String>,
  /// Serialised as `type`, the column name import files use.
  #[serde(rename = "type")]
  pub kind:          Option<TargetKind>,
  pub sector:        Option<String>,
  pub province:      Option<String>,
  pub website:       Option<String>,
  pub general_email: Option<String>,
  pub phone:         Option<String>,
  pub source:        Option<String>,
  pub notes:         Option<String>,
}

/// A raw contact row. The owning target is resolved from `target_id` first,
/// then `target_name`; a row resolving to neither is rejected as an orphan.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRow {
  pub target_id:    Option<Uuid>,
  pub target_name:  Option<String>,
  pub full_name:    Option<String>,
  pub role:         Option<String>,
  pub email:        Option<String>,
  pub phone:        Option<String>,
  pub linkedin_url: Option<String>,
}

// ─── Batch plan ──────────────────────────────────────────────────────────────

/// Which entity a batch carries; doubles as the `import_type` audit string.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImportKind {
  Targets,
  Contacts,
}

/// An update conditioned on the row version read at match time. The store
/// must fail the whole batch if the stored `updated_at` no longer matches.
#[derive(Debug, Clone)]
pub struct VersionedUpdate<T> {
  pub row:                 T,
  pub expected_updated_at: Option<DateTime<Utc>>,
}

/// Everything the store needs to commit one batch atomically. The engine has
/// already merged fields and computed counts; the store only writes.
#[derive(Debug, Clone, Default)]
pub struct ImportPlan {
  pub insert_targets:  Vec<Target>,
  pub update_targets:  Vec<VersionedUpdate<Target>>,
  pub insert_contacts: Vec<Contact>,
  pub update_contacts: Vec<VersionedUpdate<Contact>>,
}

impl ImportPlan {
  pub fn is_empty(&self) -> bool {
    self.insert_targets.is_empty()
      && self.update_targets.is_empty()
      && self.insert_contacts.is_empty()
      && self.update_contacts.is_empty()
  }
}

// ─── Reporting ───────────────────────────────────────────────────────────────

/// Per-batch result surfaced to the caller. Row-level problems land in
/// `errors` (counted as `failed`) or `warnings` (e.g. ambiguous matches
/// merged deterministically); they never abort the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
  pub inserted: u32,
  pub updated:  u32,
  pub skipped:  u32,
  pub failed:   u32,
  pub errors:   Vec<String>,
  pub warnings: Vec<String>,
}

/// Immutable audit record for one batch. Append-only; never mutated after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportLog {
  pub import_log_id: Uuid,
  pub import_type:   ImportKind,
  pub inserted:      u32,
  pub updated:       u32,
  pub skipped:       u32,
  pub failed:        u32,
  pub created_at:    DateTime<Utc>,
}
