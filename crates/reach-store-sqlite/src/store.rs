//! [`SqliteStore`] — the SQLite implementation of [`OutreachStore`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use reach_core::{
  Error as CoreError,
  contact::{Contact, NewContact},
  dnc::DncEntry,
  draft::{DraftState, NewDraft, OutreachDraft},
  followup::{FollowUp, LeadSuggestion, NewFollowUp},
  import::{ImportKind, ImportLog, ImportPlan, ImportReport},
  outreach::{NewEvent, Outcome, OutreachEvent},
  store::{OutreachStore, TargetFilter},
  target::{NewTarget, Target, TargetStatus},
};

use crate::{
  encode::{
    RawContact, RawDncEntry, RawDraft, RawEvent, RawFollowUp, RawImportLog,
    RawSuggestion, RawTarget, decode_dt, decode_uuid, encode_date, encode_dt,
    encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── SQL fragments ───────────────────────────────────────────────────────────

const INSERT_TARGET: &str = "INSERT INTO targets (
     target_id, name, kind, sector, province, website, general_email,
     phone, source, notes, status, created_at, updated_at
   ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)";

// Import updates never touch `status`; the pipeline owns it.
const UPDATE_TARGET_VERSIONED: &str = "UPDATE targets SET
     name = ?2, kind = ?3, sector = ?4, province = ?5, website = ?6,
     general_email = ?7, phone = ?8, source = ?9, notes = ?10, updated_at = ?11
   WHERE target_id = ?1 AND updated_at IS ?12";

const INSERT_CONTACT: &str = "INSERT INTO contacts (
     contact_id, target_id, full_name, role, role_en, email, phone,
     linkedin_url, confidence, created_at, updated_at
   ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

const UPDATE_CONTACT_VERSIONED: &str = "UPDATE contacts SET
     full_name = ?2, role = ?3, role_en = ?4, email = ?5, phone = ?6,
     linkedin_url = ?7, confidence = ?8, updated_at = ?9
   WHERE contact_id = ?1 AND updated_at IS ?10";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Reach outreach store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Whether a target row exists; used to reject orphan references with a
  /// typed error instead of a bare FK violation.
  async fn target_exists(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM targets WHERE target_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }
}

// Write one target/contact row on a plain connection or an open transaction.

fn exec_insert_target(
  conn: &rusqlite::Connection,
  t: &Target,
) -> rusqlite::Result<usize> {
  conn.execute(
    INSERT_TARGET,
    rusqlite::params![
      encode_uuid(t.target_id),
      t.name,
      t.kind.to_string(),
      t.sector,
      t.province,
      t.website,
      t.general_email,
      t.phone,
      t.source,
      t.notes,
      t.status.to_string(),
      encode_dt(t.created_at),
      t.updated_at.map(encode_dt),
    ],
  )
}

fn exec_insert_contact(
  conn: &rusqlite::Connection,
  c: &Contact,
) -> rusqlite::Result<usize> {
  conn.execute(
    INSERT_CONTACT,
    rusqlite::params![
      encode_uuid(c.contact_id),
      encode_uuid(c.target_id),
      c.full_name,
      c.role,
      c.role_en,
      c.email,
      c.phone,
      c.linkedin_url,
      c.confidence.to_string(),
      encode_dt(c.created_at),
      c.updated_at.map(encode_dt),
    ],
  )
}

// ─── OutreachStore impl ──────────────────────────────────────────────────────

impl OutreachStore for SqliteStore {
  type Error = Error;

  // ── Targets ────────────────────────────────────────────────────────────

  async fn add_target(&self, input: NewTarget) -> Result<Target> {
    let target = Target {
      target_id:     Uuid::new_v4(),
      name:          input.name,
      kind:          input.kind,
      sector:        input.sector,
      province:      input.province,
      website:       input.website,
      general_email: input.general_email,
      phone:         input.phone,
      source:        input.source,
      notes:         input.notes,
      status:        TargetStatus::New,
      created_at:    Utc::now(),
      updated_at:    None,
    };

    let row = target.clone();
    self
      .conn
      .call(move |conn| {
        exec_insert_target(conn, &row)?;
        Ok(())
      })
      .await?;

    Ok(target)
  }

  async fn get_target(&self, id: Uuid) -> Result<Option<Target>> {
    let id_str = encode_uuid(id);
    let sql =
      format!("SELECT {} FROM targets WHERE target_id = ?1", RawTarget::COLUMNS);

    let raw: Option<RawTarget> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawTarget::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTarget::into_target).transpose()
  }

  async fn list_targets(&self, filter: TargetFilter) -> Result<Vec<Target>> {
    let kind_str = filter.kind.map(|k| k.to_string());
    let status_str = filter.status.map(|s| s.to_string());
    let sql = format!(
      "SELECT {} FROM targets
       WHERE (?1 IS NULL OR kind = ?1) AND (?2 IS NULL OR status = ?2)
       ORDER BY created_at, target_id",
      RawTarget::COLUMNS
    );

    let raws: Vec<RawTarget> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![kind_str, status_str], RawTarget::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTarget::into_target).collect()
  }

  async fn find_targets_by_name(&self, name: &str) -> Result<Vec<Target>> {
    let name = name.to_owned();
    let sql = format!(
      "SELECT {} FROM targets WHERE name = ?1 COLLATE NOCASE
       ORDER BY created_at, target_id",
      RawTarget::COLUMNS
    );

    let raws: Vec<RawTarget> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![name], RawTarget::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTarget::into_target).collect()
  }

  async fn find_targets_by_website(&self, website: &str) -> Result<Vec<Target>> {
    let website = website.to_owned();
    let sql = format!(
      "SELECT {} FROM targets WHERE website = ?1 COLLATE NOCASE
       ORDER BY created_at, target_id",
      RawTarget::COLUMNS
    );

    let raws: Vec<RawTarget> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![website], RawTarget::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTarget::into_target).collect()
  }

  async fn set_target_status(
    &self,
    id: Uuid,
    status: TargetStatus,
  ) -> Result<Target> {
    let id_str = encode_uuid(id);
    let status_str = status.to_string();
    let now_str = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE targets SET status = ?2, updated_at = ?3 WHERE target_id = ?1",
          rusqlite::params![id_str, status_str, now_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(CoreError::TargetNotFound(id).into());
    }
    self
      .get_target(id)
      .await?
      .ok_or_else(|| CoreError::TargetNotFound(id).into())
  }

  async fn compare_and_set_status(
    &self,
    id: Uuid,
    from: TargetStatus,
    to: TargetStatus,
  ) -> Result<bool> {
    let id_str = encode_uuid(id);
    let from_str = from.to_string();
    let to_str = to.to_string();
    let now_str = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE targets SET status = ?3, updated_at = ?4
           WHERE target_id = ?1 AND status = ?2",
          rusqlite::params![id_str, from_str, to_str, now_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn targets_with_last_contacted(
    &self,
  ) -> Result<Vec<(Target, Option<DateTime<Utc>>)>> {
    let sql = format!(
      "SELECT {}, (SELECT MAX(e.sent_at) FROM outreach_events e
                   WHERE e.target_id = t.target_id) AS last_contacted
       FROM targets t ORDER BY t.created_at, t.target_id",
      RawTarget::COLUMNS
    );

    let raws: Vec<(RawTarget, Option<String>)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| Ok((RawTarget::from_row(row)?, row.get(13)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(raw, last)| {
        let target = raw.into_target()?;
        let last = last.as_deref().map(decode_dt).transpose()?;
        Ok((target, last))
      })
      .collect()
  }

  // ── Contacts ───────────────────────────────────────────────────────────

  async fn add_contact(&self, input: NewContact) -> Result<Contact> {
    if !self.target_exists(input.target_id).await? {
      return Err(CoreError::OrphanContact(input.target_id).into());
    }

    let confidence = input.confidence();
    let contact = Contact {
      contact_id:   Uuid::new_v4(),
      target_id:    input.target_id,
      full_name:    input.full_name,
      role:         input.role,
      role_en:      input.role_en,
      email:        input.email,
      phone:        input.phone,
      linkedin_url: input.linkedin_url,
      confidence,
      created_at:   Utc::now(),
      updated_at:   None,
    };

    let row = contact.clone();
    self
      .conn
      .call(move |conn| {
        exec_insert_contact(conn, &row)?;
        Ok(())
      })
      .await?;

    Ok(contact)
  }

  async fn get_contact(&self, id: Uuid) -> Result<Option<Contact>> {
    let id_str = encode_uuid(id);
    let sql = format!(
      "SELECT {} FROM contacts WHERE contact_id = ?1",
      RawContact::COLUMNS
    );

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawContact::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  async fn list_contacts(&self, target_id: Uuid) -> Result<Vec<Contact>> {
    let id_str = encode_uuid(target_id);
    let sql = format!(
      "SELECT {} FROM contacts WHERE target_id = ?1
       ORDER BY created_at, contact_id",
      RawContact::COLUMNS
    );

    let raws: Vec<RawContact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }

  // ── Import batches ─────────────────────────────────────────────────────

  async fn apply_import(
    &self,
    kind: ImportKind,
    plan: ImportPlan,
    report: &ImportReport,
  ) -> Result<ImportLog> {
    let log = ImportLog {
      import_log_id: Uuid::new_v4(),
      import_type:   kind,
      inserted:      report.inserted,
      updated:       report.updated,
      skipped:       report.skipped,
      failed:        report.failed,
      created_at:    Utc::now(),
    };

    let log_row = log.clone();
    // Inner Err carries the id of the row that hit a version conflict; the
    // transaction has already been rolled back by then.
    let outcome: std::result::Result<(), String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        for t in &plan.insert_targets {
          exec_insert_target(&tx, t)?;
        }

        for u in &plan.update_targets {
          let t = &u.row;
          let n = tx.execute(
            UPDATE_TARGET_VERSIONED,
            rusqlite::params![
              encode_uuid(t.target_id),
              t.name,
              t.kind.to_string(),
              t.sector,
              t.province,
              t.website,
              t.general_email,
              t.phone,
              t.source,
              t.notes,
              t.updated_at.map(encode_dt),
              u.expected_updated_at.map(encode_dt),
            ],
          )?;
          if n == 0 {
            tx.rollback()?;
            return Ok(Err(encode_uuid(t.target_id)));
          }
        }

        for c in &plan.insert_contacts {
          exec_insert_contact(&tx, c)?;
        }

        for u in &plan.update_contacts {
          let c = &u.row;
          let n = tx.execute(
            UPDATE_CONTACT_VERSIONED,
            rusqlite::params![
              encode_uuid(c.contact_id),
              c.full_name,
              c.role,
              c.role_en,
              c.email,
              c.phone,
              c.linkedin_url,
              c.confidence.to_string(),
              c.updated_at.map(encode_dt),
              u.expected_updated_at.map(encode_dt),
            ],
          )?;
          if n == 0 {
            tx.rollback()?;
            return Ok(Err(encode_uuid(c.contact_id)));
          }
        }

        tx.execute(
          "INSERT INTO import_logs (
             import_log_id, import_type, inserted, updated, skipped, failed,
             created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            encode_uuid(log_row.import_log_id),
            log_row.import_type.to_string(),
            log_row.inserted,
            log_row.updated,
            log_row.skipped,
            log_row.failed,
            encode_dt(log_row.created_at),
          ],
        )?;

        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    match outcome {
      Ok(()) => Ok(log),
      Err(id_str) => Err(Error::VersionConflict(decode_uuid(&id_str)?)),
    }
  }

  async fn list_import_logs(&self) -> Result<Vec<ImportLog>> {
    let sql = format!(
      "SELECT {} FROM import_logs ORDER BY created_at DESC, import_log_id",
      RawImportLog::COLUMNS
    );

    let raws: Vec<RawImportLog> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawImportLog::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawImportLog::into_log).collect()
  }

  // ── Do-not-contact registry ────────────────────────────────────────────

  async fn add_dnc_entry(
    &self,
    email: &str,
    reason: Option<String>,
  ) -> Result<DncEntry> {
    let email_lower = email.trim().to_lowercase();
    let id_str = encode_uuid(Uuid::new_v4());
    let now_str = encode_dt(Utc::now());
    let sql =
      format!("SELECT {} FROM dnc_entries WHERE email = ?1", RawDncEntry::COLUMNS);

    let raw: RawDncEntry = self
      .conn
      .call(move |conn| {
        // Re-adding an address refreshes the reason but keeps one row.
        conn.execute(
          "INSERT INTO dnc_entries (dnc_id, email, reason, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(email) DO UPDATE SET reason = excluded.reason",
          rusqlite::params![id_str, email_lower, reason, now_str],
        )?;
        Ok(conn.query_row(
          &sql,
          rusqlite::params![email_lower],
          RawDncEntry::from_row,
        )?)
      })
      .await?;

    raw.into_entry()
  }

  async fn is_suppressed(&self, email: &str) -> Result<bool> {
    let email_lower = email.trim().to_lowercase();

    let hit: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM dnc_entries WHERE email = ?1",
              rusqlite::params![email_lower],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(hit)
  }

  async fn list_dnc_entries(&self) -> Result<Vec<DncEntry>> {
    let sql = format!(
      "SELECT {} FROM dnc_entries ORDER BY created_at, dnc_id",
      RawDncEntry::COLUMNS
    );

    let raws: Vec<RawDncEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawDncEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDncEntry::into_entry).collect()
  }

  // ── Outreach events ────────────────────────────────────────────────────

  async fn record_event(&self, input: NewEvent) -> Result<OutreachEvent> {
    if !self.target_exists(input.target_id).await? {
      return Err(CoreError::TargetNotFound(input.target_id).into());
    }

    let event = OutreachEvent {
      event_id:   Uuid::new_v4(),
      target_id:  input.target_id,
      contact_id: input.contact_id,
      channel:    input.channel,
      subject:    input.subject,
      body:       input.body,
      outcome:    input.outcome,
      message_id: input.message_id,
      sent_at:    Utc::now(),
    };

    let row = event.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO outreach_events (
             event_id, target_id, contact_id, channel, subject, body,
             outcome, message_id, sent_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            encode_uuid(row.event_id),
            encode_uuid(row.target_id),
            row.contact_id.map(encode_uuid),
            row.channel.to_string(),
            row.subject,
            row.body,
            row.outcome.to_string(),
            row.message_id,
            encode_dt(row.sent_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<OutreachEvent>> {
    let id_str = encode_uuid(id);
    let sql =
      format!("SELECT {} FROM outreach_events WHERE event_id = ?1", RawEvent::COLUMNS);

    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawEvent::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn list_events(&self, target_id: Uuid) -> Result<Vec<OutreachEvent>> {
    let id_str = encode_uuid(target_id);
    let sql = format!(
      "SELECT {} FROM outreach_events WHERE target_id = ?1
       ORDER BY sent_at DESC, event_id",
      RawEvent::COLUMNS
    );

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn has_events(&self, target_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(target_id);

    let any: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM outreach_events WHERE target_id = ?1 LIMIT 1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(any)
  }

  async fn set_event_outcome(
    &self,
    id: Uuid,
    outcome: Outcome,
  ) -> Result<OutreachEvent> {
    let id_str = encode_uuid(id);
    let outcome_str = outcome.to_string();

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE outreach_events SET outcome = ?2 WHERE event_id = ?1",
          rusqlite::params![id_str, outcome_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(CoreError::EventNotFound(id).into());
    }
    self
      .get_event(id)
      .await?
      .ok_or_else(|| CoreError::EventNotFound(id).into())
  }

  // ── Drafts ─────────────────────────────────────────────────────────────

  async fn add_draft(&self, input: NewDraft) -> Result<OutreachDraft> {
    if !self.target_exists(input.target_id).await? {
      return Err(CoreError::TargetNotFound(input.target_id).into());
    }

    let draft = OutreachDraft {
      draft_id:   Uuid::new_v4(),
      target_id:  input.target_id,
      contact_id: input.contact_id,
      subject:    input.subject,
      body:       input.body,
      state:      DraftState::Draft,
      created_at: Utc::now(),
      updated_at: None,
    };

    let row = draft.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO outreach_drafts (
             draft_id, target_id, contact_id, subject, body, state,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            encode_uuid(row.draft_id),
            encode_uuid(row.target_id),
            row.contact_id.map(encode_uuid),
            row.subject,
            row.body,
            row.state.to_string(),
            encode_dt(row.created_at),
            row.updated_at.map(encode_dt),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(draft)
  }

  async fn get_draft(&self, id: Uuid) -> Result<Option<OutreachDraft>> {
    let id_str = encode_uuid(id);
    let sql =
      format!("SELECT {} FROM outreach_drafts WHERE draft_id = ?1", RawDraft::COLUMNS);

    let raw: Option<RawDraft> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawDraft::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDraft::into_draft).transpose()
  }

  async fn list_drafts(&self, state: Option<DraftState>) -> Result<Vec<OutreachDraft>> {
    let state_str = state.map(|s| s.to_string());
    let sql = format!(
      "SELECT {} FROM outreach_drafts WHERE (?1 IS NULL OR state = ?1)
       ORDER BY created_at, draft_id",
      RawDraft::COLUMNS
    );

    let raws: Vec<RawDraft> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![state_str], RawDraft::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDraft::into_draft).collect()
  }

  async fn transition_draft(
    &self,
    id: Uuid,
    from: DraftState,
    to: DraftState,
  ) -> Result<OutreachDraft> {
    if !from.can_transition(to) {
      return Err(CoreError::InvalidTransition { from, to }.into());
    }

    let id_str = encode_uuid(id);
    let from_str = from.to_string();
    let to_str = to.to_string();
    let now_str = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE outreach_drafts SET state = ?3, updated_at = ?4
           WHERE draft_id = ?1 AND state = ?2",
          rusqlite::params![id_str, from_str, to_str, now_str],
        )?)
      })
      .await?;

    if changed == 0 {
      // Missing row, or a concurrent transition won the race.
      return match self.get_draft(id).await? {
        None => Err(CoreError::DraftNotFound(id).into()),
        Some(d) => Err(
          CoreError::StateConflict {
            draft_id: id,
            expected: from,
            actual:   d.state,
          }
          .into(),
        ),
      };
    }

    self
      .get_draft(id)
      .await?
      .ok_or_else(|| CoreError::DraftNotFound(id).into())
  }

  async fn update_draft_content(
    &self,
    id: Uuid,
    subject: String,
    body: String,
  ) -> Result<OutreachDraft> {
    let id_str = encode_uuid(id);
    let now_str = encode_dt(Utc::now());

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE outreach_drafts SET subject = ?2, body = ?3, updated_at = ?4
           WHERE draft_id = ?1 AND state = 'draft'",
          rusqlite::params![id_str, subject, body, now_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return match self.get_draft(id).await? {
        None => Err(CoreError::DraftNotFound(id).into()),
        Some(d) => Err(CoreError::DraftImmutable(id, d.state).into()),
      };
    }

    self
      .get_draft(id)
      .await?
      .ok_or_else(|| CoreError::DraftNotFound(id).into())
  }

  // ── Daily send counter ─────────────────────────────────────────────────

  async fn try_reserve_send_slot(&self, day: NaiveDate, limit: u32) -> Result<bool> {
    if limit == 0 {
      return Ok(false);
    }

    let day_str = encode_date(day);

    // Single conditional upsert: concurrent reservations serialize on this
    // row, so the combined count can never pass `limit`.
    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO send_counters (day, sent) VALUES (?1, 1)
           ON CONFLICT(day) DO UPDATE SET sent = sent + 1 WHERE sent < ?2",
          rusqlite::params![day_str, limit],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn release_send_slot(&self, day: NaiveDate) -> Result<()> {
    let day_str = encode_date(day);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE send_counters SET sent = sent - 1 WHERE day = ?1 AND sent > 0",
          rusqlite::params![day_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn sends_today(&self, day: NaiveDate) -> Result<u32> {
    let day_str = encode_date(day);

    let sent: u32 = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT sent FROM send_counters WHERE day = ?1",
              rusqlite::params![day_str],
              |r| r.get(0),
            )
            .optional()?
            .unwrap_or(0),
        )
      })
      .await?;

    Ok(sent)
  }

  // ── Follow-ups & lead suggestions ──────────────────────────────────────

  async fn add_followup(&self, input: NewFollowUp) -> Result<FollowUp> {
    if !self.target_exists(input.target_id).await? {
      return Err(CoreError::TargetNotFound(input.target_id).into());
    }

    let followup = FollowUp {
      followup_id: Uuid::new_v4(),
      target_id:   input.target_id,
      due_date:    input.due_date,
      reason:      input.reason,
      done:        false,
    };

    let row = followup.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO followups (followup_id, target_id, due_date, reason, done)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            encode_uuid(row.followup_id),
            encode_uuid(row.target_id),
            encode_date(row.due_date),
            row.reason,
            row.done,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(followup)
  }

  async fn list_followups(&self, target_id: Uuid) -> Result<Vec<FollowUp>> {
    let id_str = encode_uuid(target_id);
    let sql = format!(
      "SELECT {} FROM followups WHERE target_id = ?1
       ORDER BY due_date, followup_id",
      RawFollowUp::COLUMNS
    );

    let raws: Vec<RawFollowUp> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawFollowUp::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFollowUp::into_followup).collect()
  }

  async fn mark_followup_done(&self, id: Uuid) -> Result<FollowUp> {
    let id_str = encode_uuid(id);
    let sql =
      format!("SELECT {} FROM followups WHERE followup_id = ?1", RawFollowUp::COLUMNS);

    let raw: Option<RawFollowUp> = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE followups SET done = 1 WHERE followup_id = ?1",
          rusqlite::params![id_str],
        )?;
        if n == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawFollowUp::from_row)
            .optional()?,
        )
      })
      .await?;

    raw
      .ok_or_else(|| Error::from(CoreError::FollowUpNotFound(id)))
      .and_then(RawFollowUp::into_followup)
  }

  async fn add_suggestion(
    &self,
    target_id: Uuid,
    suggestion: &str,
  ) -> Result<LeadSuggestion> {
    if !self.target_exists(target_id).await? {
      return Err(CoreError::TargetNotFound(target_id).into());
    }

    let record = LeadSuggestion {
      suggestion_id: Uuid::new_v4(),
      target_id,
      suggestion: suggestion.to_owned(),
      created_at: Utc::now(),
    };

    let row = record.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO lead_suggestions (suggestion_id, target_id, suggestion, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            encode_uuid(row.suggestion_id),
            encode_uuid(row.target_id),
            row.suggestion,
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn list_suggestions(&self, target_id: Uuid) -> Result<Vec<LeadSuggestion>> {
    let id_str = encode_uuid(target_id);
    let sql = format!(
      "SELECT {} FROM lead_suggestions WHERE target_id = ?1
       ORDER BY created_at, suggestion_id",
      RawSuggestion::COLUMNS
    );

    let raws: Vec<RawSuggestion> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawSuggestion::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSuggestion::into_suggestion).collect()
  }
}
