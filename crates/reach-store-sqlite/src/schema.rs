//! SQL schema for the Reach SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS targets (
    target_id     TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    kind          TEXT NOT NULL,   -- 'employer' | 'municipality'
    sector        TEXT,
    province      TEXT,
    website       TEXT,
    general_email TEXT,
    phone         TEXT,
    source        TEXT,
    notes         TEXT,
    status        TEXT NOT NULL DEFAULT 'new',
    created_at    TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    updated_at    TEXT
);

CREATE TABLE IF NOT EXISTS contacts (
    contact_id   TEXT PRIMARY KEY,
    target_id    TEXT NOT NULL REFERENCES targets(target_id),
    full_name    TEXT NOT NULL,
    role         TEXT,
    role_en      TEXT,
    email        TEXT,
    phone        TEXT,
    linkedin_url TEXT,
    confidence   TEXT NOT NULL DEFAULT 'low',
    created_at   TEXT NOT NULL,
    updated_at   TEXT
);

-- Outreach events are append-only. The only column ever updated is
-- `outcome`; rows are never deleted.
CREATE TABLE IF NOT EXISTS outreach_events (
    event_id   TEXT PRIMARY KEY,
    target_id  TEXT NOT NULL REFERENCES targets(target_id),
    contact_id TEXT REFERENCES contacts(contact_id),
    channel    TEXT NOT NULL,      -- 'email' | 'linkedin' | 'phone'
    subject    TEXT,
    body       TEXT NOT NULL,
    outcome    TEXT NOT NULL DEFAULT 'none',
    message_id TEXT,               -- transport id, or the preview marker
    sent_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS outreach_drafts (
    draft_id   TEXT PRIMARY KEY,
    target_id  TEXT NOT NULL REFERENCES targets(target_id),
    contact_id TEXT REFERENCES contacts(contact_id),
    subject    TEXT NOT NULL,
    body       TEXT NOT NULL,
    state      TEXT NOT NULL DEFAULT 'draft',
    created_at TEXT NOT NULL,
    updated_at TEXT
);

-- One audit row per import batch; never mutated after creation.
CREATE TABLE IF NOT EXISTS import_logs (
    import_log_id TEXT PRIMARY KEY,
    import_type   TEXT NOT NULL,   -- 'targets' | 'contacts'
    inserted      INTEGER NOT NULL,
    updated       INTEGER NOT NULL,
    skipped       INTEGER NOT NULL,
    failed        INTEGER NOT NULL,
    created_at    TEXT NOT NULL
);

-- Addresses are stored lowercased; lookups are plain equality.
CREATE TABLE IF NOT EXISTS dnc_entries (
    dnc_id     TEXT PRIMARY KEY,
    email      TEXT NOT NULL UNIQUE,
    reason     TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS followups (
    followup_id TEXT PRIMARY KEY,
    target_id   TEXT NOT NULL REFERENCES targets(target_id),
    due_date    TEXT NOT NULL,
    reason      TEXT,
    done        INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS lead_suggestions (
    suggestion_id TEXT PRIMARY KEY,
    target_id     TEXT NOT NULL REFERENCES targets(target_id),
    suggestion    TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

-- Rolling daily live-send counter. One row per calendar day; incremented
-- with a single conditional upsert so concurrent senders serialize here.
CREATE TABLE IF NOT EXISTS send_counters (
    day  TEXT PRIMARY KEY,         -- YYYY-MM-DD
    sent INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS targets_name_idx    ON targets(name COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS targets_website_idx ON targets(website COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS contacts_target_idx ON contacts(target_id);
CREATE INDEX IF NOT EXISTS events_target_idx   ON outreach_events(target_id);
CREATE INDEX IF NOT EXISTS drafts_state_idx    ON outreach_drafts(state);

PRAGMA user_version = 1;
";
