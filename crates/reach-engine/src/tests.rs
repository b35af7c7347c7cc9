//! Integration tests for the engine against an in-memory SQLite store.

use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
  time::Duration,
};

use chrono::Utc;
use reach_core::{
  contact::{Confidence, NewContact},
  draft::{DraftState, NewDraft},
  import::{ContactRow, TargetRow},
  mailer::{Mailer, MessageId, TransportError},
  outreach::{Channel, NewEvent, Outcome},
  store::{OutreachStore, TargetFilter},
  target::{NewTarget, Target, TargetKind, TargetStatus},
};
use reach_store_sqlite::SqliteStore;

use crate::{
  DraftWorkflow, Importer, SendConfig, SendError,
  export::export_targets_csv,
  pipeline::PipelineUpdater,
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

async fn store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"))
}

/// Scripted mailer: queued failures are consumed first, everything after
/// succeeds. Sleeping variant available for timeout tests.
#[derive(Default)]
struct MockMailer {
  sent:     Mutex<Vec<String>>,
  failures: Mutex<VecDeque<TransportError>>,
  delay:    Option<Duration>,
}

impl MockMailer {
  fn slow(delay: Duration) -> Self {
    Self { delay: Some(delay), ..Default::default() }
  }

  fn fail_next(&self, err: TransportError) {
    self.failures.lock().unwrap().push_back(err);
  }

  fn sent_count(&self) -> usize { self.sent.lock().unwrap().len() }
}

impl Mailer for MockMailer {
  async fn send(
    &self,
    to: &str,
    _subject: &str,
    _body: &str,
  ) -> Result<MessageId, TransportError> {
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    if let Some(err) = self.failures.lock().unwrap().pop_front() {
      return Err(err);
    }
    let mut sent = self.sent.lock().unwrap();
    sent.push(to.to_owned());
    Ok(MessageId(format!("msg-{}", sent.len())))
  }
}

fn live_config(limit: u32) -> SendConfig {
  SendConfig::live(limit, Duration::from_secs(5))
}

async fn target_with_email(store: &Arc<SqliteStore>, email: &str) -> Target {
  let mut input = NewTarget::new("Acme", TargetKind::Employer);
  input.general_email = Some(email.into());
  store.add_target(input).await.unwrap()
}

async fn approved_draft<M: Mailer>(
  workflow: &DraftWorkflow<SqliteStore, M>,
  target: &Target,
) -> reach_core::draft::OutreachDraft {
  let draft = workflow
    .create(NewDraft {
      target_id:  target.target_id,
      contact_id: None,
      subject:    "Intro".into(),
      body:       "Hello there".into(),
    })
    .await
    .unwrap();
  workflow.approve(draft.draft_id).await.unwrap()
}

fn target_row(name: &str, website: Option<&str>) -> TargetRow {
  TargetRow {
    name: Some(name.into()),
    website: website.map(Into::into),
    ..Default::default()
  }
}

// ─── Import: targets ─────────────────────────────────────────────────────────

#[tokio::test]
async fn import_is_idempotent() {
  let s = store().await;
  let importer = Importer::new(s.clone());

  let rows = vec![
    target_row("City One", Some("https://one.nl")),
    target_row("City Two", None),
  ];

  let first = importer
    .import_targets(rows.clone(), TargetKind::Municipality)
    .await
    .unwrap();
  assert_eq!(first.inserted, 2);
  assert_eq!(first.failed, 0);

  let second = importer
    .import_targets(rows, TargetKind::Municipality)
    .await
    .unwrap();
  assert_eq!(second.inserted, 0);
  assert_eq!(second.updated, 0);
  assert_eq!(second.skipped, 2);

  assert_eq!(s.list_targets(TargetFilter::default()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn import_never_blanks_a_populated_field() {
  let s = store().await;
  let importer = Importer::new(s.clone());

  let mut seed = target_row("Acme", Some("https://acme.nl"));
  seed.general_email = Some("info@acme.nl".into());
  importer
    .import_targets(vec![seed], TargetKind::Employer)
    .await
    .unwrap();

  // Same target, blank email, new phone.
  let mut update = target_row("Acme", None);
  update.general_email = Some("   ".into());
  update.phone = Some("030-1234567".into());
  let report = importer
    .import_targets(vec![update], TargetKind::Employer)
    .await
    .unwrap();
  assert_eq!(report.updated, 1);

  let targets = s.list_targets(TargetFilter::default()).await.unwrap();
  assert_eq!(targets.len(), 1);
  assert_eq!(targets[0].general_email.as_deref(), Some("info@acme.nl"));
  assert_eq!(targets[0].phone.as_deref(), Some("030-1234567"));
  assert_eq!(targets[0].website.as_deref(), Some("https://acme.nl"));
}

#[tokio::test]
async fn name_match_wins_over_website_match() {
  let s = store().await;
  let importer = Importer::new(s.clone());

  importer
    .import_targets(
      vec![target_row("Acme", Some("acme.com"))],
      TargetKind::Employer,
    )
    .await
    .unwrap();

  let report = importer
    .import_targets(
      vec![target_row("ACME", Some("other.com"))],
      TargetKind::Employer,
    )
    .await
    .unwrap();
  assert_eq!(report.updated, 1);
  assert_eq!(report.inserted, 0);

  let targets = s.list_targets(TargetFilter::default()).await.unwrap();
  assert_eq!(targets.len(), 1);
  assert_eq!(targets[0].website.as_deref(), Some("other.com"));
}

#[tokio::test]
async fn rows_in_one_batch_merge_instead_of_duplicating() {
  let s = store().await;
  let importer = Importer::new(s.clone());

  let mut second = target_row("City One", Some("https://one.nl"));
  second.phone = Some("123".into());
  let rows = vec![
    target_row("City One", Some("https://one.nl")),
    second,
    target_row("City Two", None),
  ];

  let report = importer
    .import_targets(rows, TargetKind::Municipality)
    .await
    .unwrap();
  assert_eq!(report.inserted, 2);
  assert_eq!(report.updated, 1);

  let names: Vec<String> = s
    .list_targets(TargetFilter::default())
    .await
    .unwrap()
    .into_iter()
    .map(|t| t.name)
    .collect();
  assert_eq!(names.len(), 2);
  assert!(names.contains(&"City One".to_string()));
}

#[tokio::test]
async fn rows_without_name_are_counted_failed() {
  let s = store().await;
  let importer = Importer::new(s.clone());

  let rows = vec![TargetRow::default(), target_row("Real", None)];
  let report = importer
    .import_targets(rows, TargetKind::Employer)
    .await
    .unwrap();
  assert_eq!(report.inserted, 1);
  assert_eq!(report.failed, 1);
  assert_eq!(report.errors.len(), 1);

  // The audit row carries the failure count.
  let logs = s.list_import_logs().await.unwrap();
  assert_eq!(logs.len(), 1);
  assert_eq!(logs[0].failed, 1);
  assert_eq!(logs[0].inserted, 1);
}

#[tokio::test]
async fn duplicate_names_in_store_merge_with_warning() {
  let s = store().await;
  // Dirty data: two stored rows with the same name.
  let older = s
    .add_target(NewTarget::new("Acme", TargetKind::Employer))
    .await
    .unwrap();
  s.add_target(NewTarget::new("ACME", TargetKind::Employer))
    .await
    .unwrap();

  let importer = Importer::new(s.clone());
  let mut row = target_row("acme", None);
  row.sector = Some("Steel".into());
  let report = importer
    .import_targets(vec![row], TargetKind::Employer)
    .await
    .unwrap();

  assert_eq!(report.updated, 1);
  assert_eq!(report.warnings.len(), 1);

  // Merged into the oldest row.
  let merged = s.get_target(older.target_id).await.unwrap().unwrap();
  assert_eq!(merged.sector.as_deref(), Some("Steel"));
}

// ─── Import: contacts ────────────────────────────────────────────────────────

#[tokio::test]
async fn contact_import_upserts_and_rescores() {
  let s = store().await;
  let target = s
    .add_target(NewTarget::new("City Three", TargetKind::Municipality))
    .await
    .unwrap();
  let importer = Importer::new(s.clone());

  let first = ContactRow {
    target_id: Some(target.target_id),
    full_name: Some("Jane Doe".into()),
    email: Some("jane@example.com".into()),
    ..Default::default()
  };
  let report = importer.import_contacts(vec![first.clone()]).await.unwrap();
  assert_eq!(report.inserted, 1);

  let contacts = s.list_contacts(target.target_id).await.unwrap();
  assert_eq!(contacts[0].confidence, Confidence::Medium);

  // Second batch adds the role; matched by email, rescored to high.
  let second = ContactRow {
    role: Some("Data Lead".into()),
    ..first
  };
  let report = importer.import_contacts(vec![second]).await.unwrap();
  assert_eq!(report.inserted, 0);
  assert_eq!(report.updated, 1);

  let contacts = s.list_contacts(target.target_id).await.unwrap();
  assert_eq!(contacts.len(), 1);
  assert_eq!(contacts[0].confidence, Confidence::High);
  assert_eq!(contacts[0].role.as_deref(), Some("Data Lead"));
}

#[tokio::test]
async fn contact_rows_resolve_target_by_name() {
  let s = store().await;
  s.add_target(NewTarget::new("Utrecht", TargetKind::Municipality))
    .await
    .unwrap();
  let importer = Importer::new(s.clone());

  let row = ContactRow {
    target_name: Some("utrecht".into()),
    full_name: Some("Piet Jansen".into()),
    role: Some("Burgemeester".into()),
    ..Default::default()
  };
  let report = importer.import_contacts(vec![row]).await.unwrap();
  assert_eq!(report.inserted, 1);

  let target = s.find_targets_by_name("Utrecht").await.unwrap().remove(0);
  let contacts = s.list_contacts(target.target_id).await.unwrap();
  assert_eq!(contacts[0].role_en.as_deref(), Some("Mayor"));
}

#[tokio::test]
async fn orphan_contact_rows_fail_without_aborting_the_batch() {
  let s = store().await;
  let target = s
    .add_target(NewTarget::new("Known", TargetKind::Employer))
    .await
    .unwrap();
  let importer = Importer::new(s.clone());

  let rows = vec![
    ContactRow {
      target_name: Some("Nowhere BV".into()),
      full_name: Some("Ghost".into()),
      ..Default::default()
    },
    ContactRow {
      target_id: Some(target.target_id),
      full_name: Some("Real Person".into()),
      ..Default::default()
    },
  ];
  let report = importer.import_contacts(rows).await.unwrap();
  assert_eq!(report.failed, 1);
  assert_eq!(report.inserted, 1);
  assert_eq!(s.list_contacts(target.target_id).await.unwrap().len(), 1);
}

// ─── Draft workflow ──────────────────────────────────────────────────────────

#[tokio::test]
async fn preview_send_simulates_and_still_requires_approval() {
  let s = store().await;
  let mailer = Arc::new(MockMailer::default());
  let workflow = DraftWorkflow::new(s.clone(), mailer.clone(), SendConfig::preview());
  let target = target_with_email(&s, "info@acme.nl").await;

  let draft = workflow
    .create(NewDraft {
      target_id:  target.target_id,
      contact_id: None,
      subject:    "Intro".into(),
      body:       "Hello".into(),
    })
    .await
    .unwrap();

  // Even preview mode refuses to send an unapproved draft.
  let err = workflow.send(draft.draft_id).await.unwrap_err();
  assert!(matches!(err, SendError::NotApproved(_, DraftState::Draft)));

  workflow.approve(draft.draft_id).await.unwrap();
  let event = workflow.send(draft.draft_id).await.unwrap();

  assert_eq!(event.outcome, Outcome::None);
  assert!(event.message_id.as_deref().unwrap().starts_with("preview-"));
  // No transport call, no quota consumed.
  assert_eq!(mailer.sent_count(), 0);
  assert_eq!(s.sends_today(Utc::now().date_naive()).await.unwrap(), 0);

  let sent = s.get_draft(draft.draft_id).await.unwrap().unwrap();
  assert_eq!(sent.state, DraftState::Sent);

  // Pipeline side effect: first event moves new → contacted.
  let target = s.get_target(target.target_id).await.unwrap().unwrap();
  assert_eq!(target.status, TargetStatus::Contacted);
}

#[tokio::test]
async fn live_send_delivers_and_counts() {
  let s = store().await;
  let mailer = Arc::new(MockMailer::default());
  let workflow = DraftWorkflow::new(s.clone(), mailer.clone(), live_config(10));
  let target = target_with_email(&s, "info@acme.nl").await;

  let draft = approved_draft(&workflow, &target).await;
  let event = workflow.send(draft.draft_id).await.unwrap();

  assert_eq!(mailer.sent_count(), 1);
  assert_eq!(event.message_id.as_deref(), Some("msg-1"));
  assert_eq!(s.sends_today(Utc::now().date_naive()).await.unwrap(), 1);
}

#[tokio::test]
async fn suppressed_recipient_blocks_send_and_leaves_draft_approved() {
  let s = store().await;
  let mailer = Arc::new(MockMailer::default());
  let workflow = DraftWorkflow::new(s.clone(), mailer.clone(), live_config(10));

  let target = s
    .add_target(NewTarget::new("Acme", TargetKind::Employer))
    .await
    .unwrap();
  let mut contact = NewContact::new(target.target_id, "Bad Actor");
  contact.email = Some("bad@x.com".into());
  let contact = s.add_contact(contact).await.unwrap();

  s.add_dnc_entry("Bad@X.com", Some("asked to stop".into()))
    .await
    .unwrap();

  let draft = workflow
    .create(NewDraft {
      target_id:  target.target_id,
      contact_id: Some(contact.contact_id),
      subject:    "Hi".into(),
      body:       "Hello".into(),
    })
    .await
    .unwrap();
  workflow.approve(draft.draft_id).await.unwrap();

  let err = workflow.send(draft.draft_id).await.unwrap_err();
  assert!(matches!(err, SendError::SuppressionBlocked(ref e) if e == "bad@x.com"));

  // Approved, not sent, not failed; no event, no transport call.
  let after = s.get_draft(draft.draft_id).await.unwrap().unwrap();
  assert_eq!(after.state, DraftState::Approved);
  assert!(!s.has_events(target.target_id).await.unwrap());
  assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn rate_limit_fails_the_extra_attempt_without_an_event() {
  let s = store().await;
  let mailer = Arc::new(MockMailer::default());
  let workflow = DraftWorkflow::new(s.clone(), mailer.clone(), live_config(2));
  let target = target_with_email(&s, "info@acme.nl").await;

  let first = approved_draft(&workflow, &target).await;
  let second = approved_draft(&workflow, &target).await;
  let third = approved_draft(&workflow, &target).await;

  workflow.send(first.draft_id).await.unwrap();
  workflow.send(second.draft_id).await.unwrap();

  let err = workflow.send(third.draft_id).await.unwrap_err();
  assert!(matches!(err, SendError::RateLimitExceeded { limit: 2 }));

  // The failed attempt parked the draft and produced no ledger entry.
  let parked = s.get_draft(third.draft_id).await.unwrap().unwrap();
  assert_eq!(parked.state, DraftState::Failed);
  assert_eq!(s.list_events(target.target_id).await.unwrap().len(), 2);
  assert_eq!(mailer.sent_count(), 2);
}

#[tokio::test]
async fn transport_failure_releases_quota_and_allows_resubmission() {
  let s = store().await;
  let mailer = Arc::new(MockMailer::default());
  let workflow = DraftWorkflow::new(s.clone(), mailer.clone(), live_config(5));
  let target = target_with_email(&s, "info@acme.nl").await;

  mailer.fail_next(TransportError::RecipientRejected("info@acme.nl".into()));

  let draft = approved_draft(&workflow, &target).await;
  let err = workflow.send(draft.draft_id).await.unwrap_err();
  assert!(matches!(
    err,
    SendError::Transport(TransportError::RecipientRejected(_))
  ));

  let failed = s.get_draft(draft.draft_id).await.unwrap().unwrap();
  assert_eq!(failed.state, DraftState::Failed);
  assert!(!s.has_events(target.target_id).await.unwrap());
  // Failed attempts do not consume quota.
  assert_eq!(s.sends_today(Utc::now().date_naive()).await.unwrap(), 0);

  // Resubmission is an explicit caller decision.
  workflow.resubmit(draft.draft_id).await.unwrap();
  workflow.send(draft.draft_id).await.unwrap();
  let sent = s.get_draft(draft.draft_id).await.unwrap().unwrap();
  assert_eq!(sent.state, DraftState::Sent);
}

#[tokio::test]
async fn transport_timeout_is_a_transport_failure() {
  let s = store().await;
  let mailer = Arc::new(MockMailer::slow(Duration::from_secs(5)));
  let config = SendConfig::live(5, Duration::from_millis(20));
  let workflow = DraftWorkflow::new(s.clone(), mailer, config);
  let target = target_with_email(&s, "info@acme.nl").await;

  let draft = approved_draft(&workflow, &target).await;
  let err = workflow.send(draft.draft_id).await.unwrap_err();
  assert!(matches!(err, SendError::Transport(TransportError::Timeout)));

  let failed = s.get_draft(draft.draft_id).await.unwrap().unwrap();
  assert_eq!(failed.state, DraftState::Failed);
}

#[tokio::test]
async fn rejected_draft_is_terminal() {
  let s = store().await;
  let mailer = Arc::new(MockMailer::default());
  let workflow = DraftWorkflow::new(s.clone(), mailer, SendConfig::preview());
  let target = target_with_email(&s, "info@acme.nl").await;

  let draft = workflow
    .create(NewDraft {
      target_id:  target.target_id,
      contact_id: None,
      subject:    "Hi".into(),
      body:       "Hello".into(),
    })
    .await
    .unwrap();
  workflow.reject(draft.draft_id).await.unwrap();

  let err = workflow.approve(draft.draft_id).await.unwrap_err();
  assert!(matches!(
    err,
    SendError::InvalidTransition { from: DraftState::Rejected, .. }
  ));
  assert!(!s.has_events(target.target_id).await.unwrap());
}

// ─── Pipeline updater ────────────────────────────────────────────────────────

#[tokio::test]
async fn meeting_outcome_moves_target_to_meeting_and_exports_last_contacted() {
  let s = store().await;
  let target = s
    .add_target(NewTarget::new("Acme", TargetKind::Employer))
    .await
    .unwrap();
  let pipeline = PipelineUpdater::new(s.clone());

  let event = s
    .record_event(NewEvent::new(target.target_id, Channel::Email, "pitch"))
    .await
    .unwrap();
  pipeline
    .record_outcome(event.event_id, Outcome::MeetingSet)
    .await
    .unwrap();

  let after = s.get_target(target.target_id).await.unwrap().unwrap();
  assert_eq!(after.status, TargetStatus::Meeting);

  let mut buf = Vec::new();
  export_targets_csv(s.as_ref(), &mut buf).await.unwrap();
  let csv = String::from_utf8(buf).unwrap();
  assert!(csv.contains("last_contacted"));
  assert!(csv.contains(&event.sent_at.to_rfc3339()));
}

#[tokio::test]
async fn manual_won_is_never_overridden() {
  let s = store().await;
  let target = s
    .add_target(NewTarget::new("Acme", TargetKind::Employer))
    .await
    .unwrap();
  let pipeline = PipelineUpdater::new(s.clone());

  let event = s
    .record_event(NewEvent::new(target.target_id, Channel::Email, "pitch"))
    .await
    .unwrap();
  s.set_target_status(target.target_id, TargetStatus::Won)
    .await
    .unwrap();

  pipeline
    .record_outcome(event.event_id, Outcome::Reply)
    .await
    .unwrap();
  let after = s.get_target(target.target_id).await.unwrap().unwrap();
  assert_eq!(after.status, TargetStatus::Won);
}

#[tokio::test]
async fn lost_target_reopens_on_reply() {
  let s = store().await;
  let target = s
    .add_target(NewTarget::new("Acme", TargetKind::Employer))
    .await
    .unwrap();
  let pipeline = PipelineUpdater::new(s.clone());

  let event = s
    .record_event(NewEvent::new(target.target_id, Channel::Email, "pitch"))
    .await
    .unwrap();
  s.set_target_status(target.target_id, TargetStatus::Lost)
    .await
    .unwrap();

  pipeline
    .record_outcome(event.event_id, Outcome::Reply)
    .await
    .unwrap();
  let after = s.get_target(target.target_id).await.unwrap().unwrap();
  assert_eq!(after.status, TargetStatus::Replied);
}

#[tokio::test]
async fn quiet_targets_export_an_empty_last_contacted() {
  let s = store().await;
  s.add_target(NewTarget::new("Quiet", TargetKind::Employer))
    .await
    .unwrap();

  let mut buf = Vec::new();
  export_targets_csv(s.as_ref(), &mut buf).await.unwrap();
  let csv = String::from_utf8(buf).unwrap();

  let line = csv.lines().find(|l| l.contains("Quiet")).unwrap();
  assert!(line.ends_with(','));
}
