//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use reach_core::{
  contact::NewContact,
  draft::{DraftState, NewDraft},
  followup::NewFollowUp,
  import::{ImportKind, ImportPlan, ImportReport, VersionedUpdate},
  outreach::{Channel, NewEvent, Outcome},
  store::{OutreachStore, TargetFilter},
  target::{NewTarget, Target, TargetKind, TargetStatus},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn employer(name: &str) -> NewTarget {
  NewTarget::new(name, TargetKind::Employer)
}

// ─── Targets ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_target() {
  let s = store().await;

  let target = s.add_target(employer("Acme")).await.unwrap();
  assert_eq!(target.status, TargetStatus::New);

  let fetched = s.get_target(target.target_id).await.unwrap().unwrap();
  assert_eq!(fetched.target_id, target.target_id);
  assert_eq!(fetched.name, "Acme");
  assert_eq!(fetched.kind, TargetKind::Employer);
}

#[tokio::test]
async fn get_target_missing_returns_none() {
  let s = store().await;
  assert!(s.get_target(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_targets_filtered() {
  let s = store().await;
  s.add_target(employer("A")).await.unwrap();
  s.add_target(NewTarget::new("B", TargetKind::Municipality))
    .await
    .unwrap();
  let c = s.add_target(employer("C")).await.unwrap();
  s.set_target_status(c.target_id, TargetStatus::Contacted)
    .await
    .unwrap();

  let all = s.list_targets(TargetFilter::default()).await.unwrap();
  assert_eq!(all.len(), 3);

  let employers = s
    .list_targets(TargetFilter {
      kind: Some(TargetKind::Employer),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(employers.len(), 2);

  let contacted = s
    .list_targets(TargetFilter {
      status: Some(TargetStatus::Contacted),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(contacted.len(), 1);
  assert_eq!(contacted[0].target_id, c.target_id);
}

#[tokio::test]
async fn find_by_name_is_case_insensitive_and_oldest_first() {
  let s = store().await;
  let first = s.add_target(employer("Acme")).await.unwrap();
  let second = s.add_target(employer("ACME")).await.unwrap();

  let found = s.find_targets_by_name("acme").await.unwrap();
  assert_eq!(found.len(), 2);
  assert_eq!(found[0].target_id, first.target_id);
  assert_eq!(found[1].target_id, second.target_id);
}

#[tokio::test]
async fn find_by_website_is_case_insensitive() {
  let s = store().await;
  let mut input = employer("Acme");
  input.website = Some("https://Acme.example".into());
  let target = s.add_target(input).await.unwrap();

  let found = s
    .find_targets_by_website("https://acme.example")
    .await
    .unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].target_id, target.target_id);
}

#[tokio::test]
async fn compare_and_set_status_requires_expected() {
  let s = store().await;
  let t = s.add_target(employer("Acme")).await.unwrap();

  assert!(
    s.compare_and_set_status(t.target_id, TargetStatus::New, TargetStatus::Contacted)
      .await
      .unwrap()
  );
  // Stale expectation: no write.
  assert!(
    !s.compare_and_set_status(t.target_id, TargetStatus::New, TargetStatus::Replied)
      .await
      .unwrap()
  );
  let fetched = s.get_target(t.target_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, TargetStatus::Contacted);
}

// ─── Contacts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_contact_and_list() {
  let s = store().await;
  let t = s.add_target(employer("Acme")).await.unwrap();

  let mut input = NewContact::new(t.target_id, "Jane Doe");
  input.email = Some("jane@acme.example".into());
  input.role = Some("Mayor".into());
  let contact = s.add_contact(input).await.unwrap();
  assert_eq!(contact.confidence, reach_core::contact::Confidence::High);

  let contacts = s.list_contacts(t.target_id).await.unwrap();
  assert_eq!(contacts.len(), 1);
  assert_eq!(contacts[0].contact_id, contact.contact_id);
}

#[tokio::test]
async fn orphan_contact_is_rejected() {
  let s = store().await;
  let err = s
    .add_contact(NewContact::new(Uuid::new_v4(), "Nobody"))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(reach_core::Error::OrphanContact(_))
  ));
}

// ─── Import batches ──────────────────────────────────────────────────────────

fn plain_target(name: &str) -> Target {
  Target {
    target_id:     Uuid::new_v4(),
    name:          name.into(),
    kind:          TargetKind::Employer,
    sector:        None,
    province:      None,
    website:       None,
    general_email: None,
    phone:         None,
    source:        None,
    notes:         None,
    status:        TargetStatus::New,
    created_at:    chrono::Utc::now(),
    updated_at:    None,
  }
}

#[tokio::test]
async fn apply_import_commits_plan_and_log() {
  let s = store().await;

  let plan = ImportPlan {
    insert_targets: vec![plain_target("One"), plain_target("Two")],
    ..Default::default()
  };
  let report = ImportReport {
    inserted: 2,
    ..Default::default()
  };

  let log = s
    .apply_import(ImportKind::Targets, plan, &report)
    .await
    .unwrap();
  assert_eq!(log.inserted, 2);
  assert_eq!(log.import_type, ImportKind::Targets);

  assert_eq!(s.list_targets(TargetFilter::default()).await.unwrap().len(), 2);
  let logs = s.list_import_logs().await.unwrap();
  assert_eq!(logs.len(), 1);
  assert_eq!(logs[0].import_log_id, log.import_log_id);
}

#[tokio::test]
async fn apply_import_writes_log_for_empty_plan() {
  let s = store().await;

  let report = ImportReport {
    failed: 3,
    errors: vec!["missing name".into(); 3],
    ..Default::default()
  };
  let log = s
    .apply_import(ImportKind::Targets, ImportPlan::default(), &report)
    .await
    .unwrap();
  assert_eq!(log.failed, 3);
  assert_eq!(s.list_import_logs().await.unwrap().len(), 1);
}

#[tokio::test]
async fn version_conflict_rolls_back_whole_batch() {
  let s = store().await;
  let existing = s.add_target(employer("Acme")).await.unwrap();

  // Someone else updates the row after we read it.
  s.set_target_status(existing.target_id, TargetStatus::Contacted)
    .await
    .unwrap();

  let mut updated = existing.clone();
  updated.sector = Some("Steel".into());
  updated.updated_at = Some(chrono::Utc::now());

  let plan = ImportPlan {
    insert_targets: vec![plain_target("Fresh")],
    update_targets: vec![VersionedUpdate {
      row:                 updated,
      // Read before the concurrent write: stale.
      expected_updated_at: existing.updated_at,
    }],
    ..Default::default()
  };
  let report = ImportReport {
    inserted: 1,
    updated: 1,
    ..Default::default()
  };

  let err = s
    .apply_import(ImportKind::Targets, plan, &report)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::VersionConflict(_)));

  // Nothing from the batch may survive: no insert, no log row.
  assert_eq!(s.list_targets(TargetFilter::default()).await.unwrap().len(), 1);
  assert!(s.list_import_logs().await.unwrap().is_empty());
}

// ─── Do-not-contact ──────────────────────────────────────────────────────────

#[tokio::test]
async fn dnc_lookup_is_case_insensitive() {
  let s = store().await;
  s.add_dnc_entry("Bad@X.com", Some("asked to stop".into()))
    .await
    .unwrap();

  assert!(s.is_suppressed("bad@x.com").await.unwrap());
  assert!(s.is_suppressed("BAD@X.COM").await.unwrap());
  assert!(!s.is_suppressed("fine@x.com").await.unwrap());
}

#[tokio::test]
async fn dnc_readd_keeps_one_row_and_updates_reason() {
  let s = store().await;
  s.add_dnc_entry("a@x.com", None).await.unwrap();
  let entry = s
    .add_dnc_entry("A@X.COM", Some("second ask".into()))
    .await
    .unwrap();

  assert_eq!(entry.reason.as_deref(), Some("second ask"));
  assert_eq!(s.list_dnc_entries().await.unwrap().len(), 1);
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_event_and_set_outcome() {
  let s = store().await;
  let t = s.add_target(employer("Acme")).await.unwrap();

  assert!(!s.has_events(t.target_id).await.unwrap());

  let event = s
    .record_event(NewEvent::new(t.target_id, Channel::Email, "hello"))
    .await
    .unwrap();
  assert_eq!(event.outcome, Outcome::None);
  assert!(s.has_events(t.target_id).await.unwrap());

  let updated = s
    .set_event_outcome(event.event_id, Outcome::Reply)
    .await
    .unwrap();
  assert_eq!(updated.outcome, Outcome::Reply);
}

#[tokio::test]
async fn event_for_missing_target_errors() {
  let s = store().await;
  let err = s
    .record_event(NewEvent::new(Uuid::new_v4(), Channel::Email, "x"))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(reach_core::Error::TargetNotFound(_))
  ));
}

#[tokio::test]
async fn last_contacted_is_max_sent_at() {
  let s = store().await;
  let t = s.add_target(employer("Acme")).await.unwrap();
  let quiet = s.add_target(employer("Quiet")).await.unwrap();

  s.record_event(NewEvent::new(t.target_id, Channel::Email, "first"))
    .await
    .unwrap();
  let last = s
    .record_event(NewEvent::new(t.target_id, Channel::Email, "second"))
    .await
    .unwrap();

  let rows = s.targets_with_last_contacted().await.unwrap();
  let acme = rows.iter().find(|(x, _)| x.target_id == t.target_id).unwrap();
  assert_eq!(acme.1, Some(last.sent_at));

  let silent = rows
    .iter()
    .find(|(x, _)| x.target_id == quiet.target_id)
    .unwrap();
  assert!(silent.1.is_none());
}

// ─── Drafts ──────────────────────────────────────────────────────────────────

async fn draft_for(s: &SqliteStore) -> reach_core::draft::OutreachDraft {
  let t = s.add_target(employer("Acme")).await.unwrap();
  s.add_draft(NewDraft {
    target_id:  t.target_id,
    contact_id: None,
    subject:    "Intro".into(),
    body:       "Hello".into(),
  })
  .await
  .unwrap()
}

#[tokio::test]
async fn draft_transitions_follow_the_table() {
  let s = store().await;
  let d = draft_for(&s).await;
  assert_eq!(d.state, DraftState::Draft);

  let approved = s
    .transition_draft(d.draft_id, DraftState::Draft, DraftState::Approved)
    .await
    .unwrap();
  assert_eq!(approved.state, DraftState::Approved);

  let err = s
    .transition_draft(d.draft_id, DraftState::Draft, DraftState::Approved)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(reach_core::Error::StateConflict { .. })
  ));
}

#[tokio::test]
async fn illegal_transition_is_rejected_before_any_write() {
  let s = store().await;
  let d = draft_for(&s).await;

  let err = s
    .transition_draft(d.draft_id, DraftState::Draft, DraftState::Sent)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(reach_core::Error::InvalidTransition { .. })
  ));

  let fetched = s.get_draft(d.draft_id).await.unwrap().unwrap();
  assert_eq!(fetched.state, DraftState::Draft);
}

#[tokio::test]
async fn approved_drafts_are_immutable() {
  let s = store().await;
  let d = draft_for(&s).await;

  let edited = s
    .update_draft_content(d.draft_id, "New subject".into(), "New body".into())
    .await
    .unwrap();
  assert_eq!(edited.subject, "New subject");

  s.transition_draft(d.draft_id, DraftState::Draft, DraftState::Approved)
    .await
    .unwrap();
  let err = s
    .update_draft_content(d.draft_id, "Nope".into(), "Nope".into())
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(reach_core::Error::DraftImmutable(_, DraftState::Approved))
  ));
}

// ─── Send counter ────────────────────────────────────────────────────────────

#[tokio::test]
async fn send_counter_enforces_daily_cap() {
  let s = store().await;
  let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

  assert!(s.try_reserve_send_slot(day, 2).await.unwrap());
  assert!(s.try_reserve_send_slot(day, 2).await.unwrap());
  // Third attempt the same day: cap reached.
  assert!(!s.try_reserve_send_slot(day, 2).await.unwrap());
  assert_eq!(s.sends_today(day).await.unwrap(), 2);

  // Another day is a fresh counter.
  let next = day.succ_opt().unwrap();
  assert!(s.try_reserve_send_slot(next, 2).await.unwrap());
}

#[tokio::test]
async fn released_slot_does_not_consume_quota() {
  let s = store().await;
  let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

  assert!(s.try_reserve_send_slot(day, 1).await.unwrap());
  s.release_send_slot(day).await.unwrap();
  assert_eq!(s.sends_today(day).await.unwrap(), 0);
  assert!(s.try_reserve_send_slot(day, 1).await.unwrap());
}

#[tokio::test]
async fn zero_limit_blocks_everything() {
  let s = store().await;
  let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
  assert!(!s.try_reserve_send_slot(day, 0).await.unwrap());
}

// ─── Follow-ups ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn followup_lifecycle() {
  let s = store().await;
  let t = s.add_target(employer("Acme")).await.unwrap();

  let f = s
    .add_followup(NewFollowUp {
      target_id: t.target_id,
      due_date:  NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
      reason:    Some("check back".into()),
    })
    .await
    .unwrap();
  assert!(!f.done);

  let done = s.mark_followup_done(f.followup_id).await.unwrap();
  assert!(done.done);

  let listed = s.list_followups(t.target_id).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert!(listed[0].done);
}

#[tokio::test]
async fn suggestion_requires_existing_target() {
  let s = store().await;
  let err = s
    .add_suggestion(Uuid::new_v4(), "try the mobility angle")
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(reach_core::Error::TargetNotFound(_))
  ));

  let t = s.add_target(employer("Acme")).await.unwrap();
  let rec = s
    .add_suggestion(t.target_id, "try the mobility angle")
    .await
    .unwrap();
  assert_eq!(s.list_suggestions(t.target_id).await.unwrap().len(), 1);
  assert_eq!(rec.target_id, t.target_id);
}
