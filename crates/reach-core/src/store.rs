//! The `OutreachStore` trait.
//!
//! Implemented by storage backends (e.g. `reach-store-sqlite`). The engines
//! and API depend on this abstraction, not on any concrete backend.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
  contact::{Contact, NewContact},
  dnc::DncEntry,
  draft::{DraftState, NewDraft, OutreachDraft},
  followup::{FollowUp, LeadSuggestion, NewFollowUp},
  import::{ImportKind, ImportLog, ImportPlan, ImportReport},
  outreach::{NewEvent, Outcome, OutreachEvent},
  target::{NewTarget, Target, TargetKind, TargetStatus},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Filters for [`OutreachStore::list_targets`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetFilter {
  pub kind:   Option<TargetKind>,
  pub status: Option<TargetStatus>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an outreach tracker storage backend.
///
/// Matching lookups (`find_*`) compare case-insensitively and return
/// candidates in (`created_at`, id) ascending order, so the matcher's
/// ambiguity policy is deterministic. Conditional writes (`transition_draft`,
/// `compare_and_set_status`, the versioned updates inside `apply_import`, the
/// send counter) are each a single atomic statement at the backend.
pub trait OutreachStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Targets ───────────────────────────────────────────────────────────

  /// Create and persist a target with status `new`.
  fn add_target(
    &self,
    input: NewTarget,
  ) -> impl Future<Output = Result<Target, Self::Error>> + Send + '_;

  /// Retrieve a target by id. Returns `None` if not found.
  fn get_target(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Target>, Self::Error>> + Send + '_;

  /// List targets, optionally filtered by kind and/or status.
  fn list_targets(
    &self,
    filter: TargetFilter,
  ) -> impl Future<Output = Result<Vec<Target>, Self::Error>> + Send + '_;

  /// All targets whose name matches case-insensitively, oldest first.
  fn find_targets_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Vec<Target>, Self::Error>> + Send + 'a;

  /// All targets whose website matches case-insensitively, oldest first.
  fn find_targets_by_website<'a>(
    &'a self,
    website: &'a str,
  ) -> impl Future<Output = Result<Vec<Target>, Self::Error>> + Send + 'a;

  /// Unconditional manual status update. Errors if the target is missing.
  fn set_target_status(
    &self,
    id: Uuid,
    status: TargetStatus,
  ) -> impl Future<Output = Result<Target, Self::Error>> + Send + '_;

  /// Conditionally move `id` from `from` to `to`. Returns `false` (and
  /// writes nothing) when the stored status is no longer `from`.
  fn compare_and_set_status(
    &self,
    id: Uuid,
    from: TargetStatus,
    to: TargetStatus,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Targets joined with `max(sent_at)` over their events, for the export.
  fn targets_with_last_contacted(
    &self,
  ) -> impl Future<
    Output = Result<Vec<(Target, Option<DateTime<Utc>>)>, Self::Error>,
  > + Send
  + '_;

  // ── Contacts ──────────────────────────────────────────────────────────

  /// Create and persist a contact. Rejects orphans (missing target).
  fn add_contact(
    &self,
    input: NewContact,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  fn get_contact(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// All contacts belonging to a target, oldest first.
  fn list_contacts(
    &self,
    target_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  // ── Import batches ────────────────────────────────────────────────────

  /// Apply one batch plan in a single transaction and persist its
  /// [`ImportLog`]. Either every write in the plan commits or none do.
  ///
  /// Versioned updates are conditioned on the `updated_at` captured at match
  /// time; a mismatch fails (and rolls back) the whole batch. The log row is
  /// written even for a plan with no accepted rows.
  fn apply_import<'a>(
    &'a self,
    kind: ImportKind,
    plan: ImportPlan,
    report: &'a ImportReport,
  ) -> impl Future<Output = Result<ImportLog, Self::Error>> + Send + 'a;

  /// Audit log rows, newest first.
  fn list_import_logs(
    &self,
  ) -> impl Future<Output = Result<Vec<ImportLog>, Self::Error>> + Send + '_;

  // ── Do-not-contact registry ───────────────────────────────────────────

  /// Register an email as do-not-contact. The address is stored lowercased.
  fn add_dnc_entry<'a>(
    &'a self,
    email: &'a str,
    reason: Option<String>,
  ) -> impl Future<Output = Result<DncEntry, Self::Error>> + Send + 'a;

  /// Exact case-insensitive membership check.
  fn is_suppressed<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn list_dnc_entries(
    &self,
  ) -> impl Future<Output = Result<Vec<DncEntry>, Self::Error>> + Send + '_;

  // ── Outreach events ───────────────────────────────────────────────────

  /// Append an event to the ledger. `sent_at` is set by the store.
  fn record_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<OutreachEvent, Self::Error>> + Send + '_;

  fn get_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<OutreachEvent>, Self::Error>> + Send + '_;

  /// Events for a target, newest first.
  fn list_events(
    &self,
    target_id: Uuid,
  ) -> impl Future<Output = Result<Vec<OutreachEvent>, Self::Error>> + Send + '_;

  /// Whether the target has any events at all.
  fn has_events(
    &self,
    target_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Record the outcome of an existing event. The only mutation events
  /// admit.
  fn set_event_outcome(
    &self,
    id: Uuid,
    outcome: Outcome,
  ) -> impl Future<Output = Result<OutreachEvent, Self::Error>> + Send + '_;

  // ── Drafts ────────────────────────────────────────────────────────────

  /// Create a draft in [`DraftState::Draft`].
  fn add_draft(
    &self,
    input: NewDraft,
  ) -> impl Future<Output = Result<OutreachDraft, Self::Error>> + Send + '_;

  fn get_draft(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<OutreachDraft>, Self::Error>> + Send + '_;

  fn list_drafts(
    &self,
    state: Option<DraftState>,
  ) -> impl Future<Output = Result<Vec<OutreachDraft>, Self::Error>> + Send + '_;

  /// Atomically move a draft from `from` to `to`. Fails when the stored
  /// state is not `from` (concurrent transition) or the move is not in the
  /// transition table.
  fn transition_draft(
    &self,
    id: Uuid,
    from: DraftState,
    to: DraftState,
  ) -> impl Future<Output = Result<OutreachDraft, Self::Error>> + Send + '_;

  /// Replace subject/body. Only legal while the draft is editable.
  fn update_draft_content(
    &self,
    id: Uuid,
    subject: String,
    body: String,
  ) -> impl Future<Output = Result<OutreachDraft, Self::Error>> + Send + '_;

  // ── Daily send counter ────────────────────────────────────────────────

  /// Reserve one send slot for `day` under `limit` with a single conditional
  /// upsert. Returns `false` when the cap is already consumed.
  fn try_reserve_send_slot(
    &self,
    day: NaiveDate,
    limit: u32,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Return a reserved slot after a failed transport attempt, so failures do
  /// not consume quota.
  fn release_send_slot(
    &self,
    day: NaiveDate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Slots consumed on `day` so far.
  fn sends_today(
    &self,
    day: NaiveDate,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  // ── Follow-ups & lead suggestions ─────────────────────────────────────

  fn add_followup(
    &self,
    input: NewFollowUp,
  ) -> impl Future<Output = Result<FollowUp, Self::Error>> + Send + '_;

  /// Follow-ups for a target ordered by due date.
  fn list_followups(
    &self,
    target_id: Uuid,
  ) -> impl Future<Output = Result<Vec<FollowUp>, Self::Error>> + Send + '_;

  fn mark_followup_done(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<FollowUp, Self::Error>> + Send + '_;

  fn add_suggestion<'a>(
    &'a self,
    target_id: Uuid,
    suggestion: &'a str,
  ) -> impl Future<Output = Result<LeadSuggestion, Self::Error>> + Send + 'a;

  fn list_suggestions(
    &self,
    target_id: Uuid,
  ) -> impl Future<Output = Result<Vec<LeadSuggestion>, Self::Error>> + Send + '_;
}
