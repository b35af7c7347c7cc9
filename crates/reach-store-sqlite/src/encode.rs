//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, dates as `YYYY-MM-DD`.
//! Enums round-trip through their `Display`/`FromStr` forms (strum). UUIDs
//! are stored as hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use reach_core::{
  contact::Contact,
  dnc::DncEntry,
  draft::OutreachDraft,
  followup::{FollowUp, LeadSuggestion},
  import::ImportLog,
  outreach::OutreachEvent,
  target::Target,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("bad date {s:?}: {e}")))
}

/// Decode a strum-backed enum from its stored string form.
pub fn decode_enum<T: FromStr>(s: &str, what: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown {what}: {s:?}")))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `targets` row.
pub struct RawTarget {
  pub target_id:     String,
  pub name:          String,
  pub kind:          String,
  pub sector:        Option<String>,
  pub province:      Option<String>,
  pub website:       Option<String>,
  pub general_email: Option<String>,
  pub phone:         Option<String>,
  pub source:        Option<String>,
  pub notes:         Option<String>,
  pub status:        String,
  pub created_at:    String,
  pub updated_at:    Option<String>,
}

impl RawTarget {
  /// Column list matching [`Self::from_row`]; keep the two in sync.
  pub const COLUMNS: &'static str = "target_id, name, kind, sector, province, \
     website, general_email, phone, source, notes, status, created_at, updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      target_id:     row.get(0)?,
      name:          row.get(1)?,
      kind:          row.get(2)?,
      sector:        row.get(3)?,
      province:      row.get(4)?,
      website:       row.get(5)?,
      general_email: row.get(6)?,
      phone:         row.get(7)?,
      source:        row.get(8)?,
      notes:         row.get(9)?,
      status:        row.get(10)?,
      created_at:    row.get(11)?,
      updated_at:    row.get(12)?,
    })
  }

  pub fn into_target(self) -> Result<Target> {
    Ok(Target {
      target_id:     decode_uuid(&self.target_id)?,
      name:          self.name,
      kind:          decode_enum(&self.kind, "target kind")?,
      sector:        self.sector,
      province:      self.province,
      website:       self.website,
      general_email: self.general_email,
      phone:         self.phone,
      source:        self.source,
      notes:         self.notes,
      status:        decode_enum(&self.status, "target status")?,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_opt_dt(self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `contacts` row.
pub struct RawContact {
  pub contact_id:   String,
  pub target_id:    String,
  pub full_name:    String,
  pub role:         Option<String>,
  pub role_en:      Option<String>,
  pub email:        Option<String>,
  pub phone:        Option<String>,
  pub linkedin_url: Option<String>,
  pub confidence:   String,
  pub created_at:   String,
  pub updated_at:   Option<String>,
}

impl RawContact {
  pub const COLUMNS: &'static str = "contact_id, target_id, full_name, role, \
     role_en, email, phone, linkedin_url, confidence, created_at, updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      contact_id:   row.get(0)?,
      target_id:    row.get(1)?,
      full_name:    row.get(2)?,
      role:         row.get(3)?,
      role_en:      row.get(4)?,
      email:        row.get(5)?,
      phone:        row.get(6)?,
      linkedin_url: row.get(7)?,
      confidence:   row.get(8)?,
      created_at:   row.get(9)?,
      updated_at:   row.get(10)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      contact_id:   decode_uuid(&self.contact_id)?,
      target_id:    decode_uuid(&self.target_id)?,
      full_name:    self.full_name,
      role:         self.role,
      role_en:      self.role_en,
      email:        self.email,
      phone:        self.phone,
      linkedin_url: self.linkedin_url,
      confidence:   decode_enum(&self.confidence, "confidence")?,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_opt_dt(self.updated_at)?,
    })
  }
}

/// Raw strings read directly from an `outreach_events` row.
pub struct RawEvent {
  pub event_id:   String,
  pub target_id:  String,
  pub contact_id: Option<String>,
  pub channel:    String,
  pub subject:    Option<String>,
  pub body:       String,
  pub outcome:    String,
  pub message_id: Option<String>,
  pub sent_at:    String,
}

impl RawEvent {
  pub const COLUMNS: &'static str = "event_id, target_id, contact_id, channel, \
     subject, body, outcome, message_id, sent_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:   row.get(0)?,
      target_id:  row.get(1)?,
      contact_id: row.get(2)?,
      channel:    row.get(3)?,
      subject:    row.get(4)?,
      body:       row.get(5)?,
      outcome:    row.get(6)?,
      message_id: row.get(7)?,
      sent_at:    row.get(8)?,
    })
  }

  pub fn into_event(self) -> Result<OutreachEvent> {
    Ok(OutreachEvent {
      event_id:   decode_uuid(&self.event_id)?,
      target_id:  decode_uuid(&self.target_id)?,
      contact_id: decode_opt_uuid(self.contact_id)?,
      channel:    decode_enum(&self.channel, "channel")?,
      subject:    self.subject,
      body:       self.body,
      outcome:    decode_enum(&self.outcome, "outcome")?,
      message_id: self.message_id,
      sent_at:    decode_dt(&self.sent_at)?,
    })
  }
}

/// Raw strings read directly from an `outreach_drafts` row.
pub struct RawDraft {
  pub draft_id:   String,
  pub target_id:  String,
  pub contact_id: Option<String>,
  pub subject:    String,
  pub body:       String,
  pub state:      String,
  pub created_at: String,
  pub updated_at: Option<String>,
}

impl RawDraft {
  pub const COLUMNS: &'static str =
    "draft_id, target_id, contact_id, subject, body, state, created_at, updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      draft_id:   row.get(0)?,
      target_id:  row.get(1)?,
      contact_id: row.get(2)?,
      subject:    row.get(3)?,
      body:       row.get(4)?,
      state:      row.get(5)?,
      created_at: row.get(6)?,
      updated_at: row.get(7)?,
    })
  }

  pub fn into_draft(self) -> Result<OutreachDraft> {
    Ok(OutreachDraft {
      draft_id:   decode_uuid(&self.draft_id)?,
      target_id:  decode_uuid(&self.target_id)?,
      contact_id: decode_opt_uuid(self.contact_id)?,
      subject:    self.subject,
      body:       self.body,
      state:      decode_enum(&self.state, "draft state")?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_opt_dt(self.updated_at)?,
    })
  }
}

/// Raw strings read directly from an `import_logs` row.
pub struct RawImportLog {
  pub import_log_id: String,
  pub import_type:   String,
  pub inserted:      u32,
  pub updated:       u32,
  pub skipped:       u32,
  pub failed:        u32,
  pub created_at:    String,
}

impl RawImportLog {
  pub const COLUMNS: &'static str =
    "import_log_id, import_type, inserted, updated, skipped, failed, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      import_log_id: row.get(0)?,
      import_type:   row.get(1)?,
      inserted:      row.get(2)?,
      updated:       row.get(3)?,
      skipped:       row.get(4)?,
      failed:        row.get(5)?,
      created_at:    row.get(6)?,
    })
  }

  pub fn into_log(self) -> Result<ImportLog> {
    Ok(ImportLog {
      import_log_id: decode_uuid(&self.import_log_id)?,
      import_type:   decode_enum(&self.import_type, "import type")?,
      inserted:      self.inserted,
      updated:       self.updated,
      skipped:       self.skipped,
      failed:        self.failed,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `dnc_entries` row.
pub struct RawDncEntry {
  pub dnc_id:     String,
  pub email:      String,
  pub reason:     Option<String>,
  pub created_at: String,
}

impl RawDncEntry {
  pub const COLUMNS: &'static str = "dnc_id, email, reason, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      dnc_id:     row.get(0)?,
      email:      row.get(1)?,
      reason:     row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_entry(self) -> Result<DncEntry> {
    Ok(DncEntry {
      dnc_id:     decode_uuid(&self.dnc_id)?,
      email:      self.email,
      reason:     self.reason,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `followups` row.
pub struct RawFollowUp {
  pub followup_id: String,
  pub target_id:   String,
  pub due_date:    String,
  pub reason:      Option<String>,
  pub done:        bool,
}

impl RawFollowUp {
  pub const COLUMNS: &'static str = "followup_id, target_id, due_date, reason, done";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      followup_id: row.get(0)?,
      target_id:   row.get(1)?,
      due_date:    row.get(2)?,
      reason:      row.get(3)?,
      done:        row.get(4)?,
    })
  }

  pub fn into_followup(self) -> Result<FollowUp> {
    Ok(FollowUp {
      followup_id: decode_uuid(&self.followup_id)?,
      target_id:   decode_uuid(&self.target_id)?,
      due_date:    decode_date(&self.due_date)?,
      reason:      self.reason,
      done:        self.done,
    })
  }
}

/// Raw strings read directly from a `lead_suggestions` row.
pub struct RawSuggestion {
  pub suggestion_id: String,
  pub target_id:     String,
  pub suggestion:    String,
  pub created_at:    String,
}

impl RawSuggestion {
  pub const COLUMNS: &'static str = "suggestion_id, target_id, suggestion, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      suggestion_id: row.get(0)?,
      target_id:     row.get(1)?,
      suggestion:    row.get(2)?,
      created_at:    row.get(3)?,
    })
  }

  pub fn into_suggestion(self) -> Result<LeadSuggestion> {
    Ok(LeadSuggestion {
      suggestion_id: decode_uuid(&self.suggestion_id)?,
      target_id:     decode_uuid(&self.target_id)?,
      suggestion:    self.suggestion,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
