//! Reconciliation matcher — pure create/update/reject decisions.
//!
//! The matcher never touches storage. The importer fetches candidate rows,
//! the matcher classifies one incoming row against them. Precedence:
//! targets match on name first, website second; contacts match on email
//! first, full name second.

use reach_core::{
  contact::Contact,
  import::{ContactRow, TargetRow},
  target::Target,
};

/// Case-insensitive comparison after trimming. Candidate lookups at the store
/// are ASCII-folded; this also folds the rest of Unicode, which matters for
/// Dutch municipality names.
pub(crate) fn eq_ci(a: &str, b: &str) -> bool {
  a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn non_empty(s: &Option<String>) -> Option<&str> {
  s.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ─── Targets ─────────────────────────────────────────────────────────────────

/// What to do with one incoming target row.
#[derive(Debug, Clone)]
pub enum TargetDecision {
  Create,
  Update {
    existing:  Target,
    /// More than one candidate matched; merged deterministically and flagged
    /// in the report instead of aborting the batch.
    ambiguous: bool,
  },
  Reject {
    reason: String,
  },
}

/// Duplicate-match fallback policy: of several candidates, merge into the
/// oldest row — (`created_at`, id) ascending. Kept separate so the choice is
/// swappable without touching the matcher.
pub fn resolve_ambiguous(candidates: &[Target]) -> Option<&Target> {
  candidates.iter().min_by(|a, b| {
    (a.created_at, a.target_id).cmp(&(b.created_at, b.target_id))
  })
}

/// Classify an incoming target row against candidates matched by name and by
/// website. Name precedence wins: website candidates are only consulted when
/// no name candidate exists.
pub fn match_target(
  row: &TargetRow,
  by_name: &[Target],
  by_website: &[Target],
) -> TargetDecision {
  let Some(name) = non_empty(&row.name) else {
    return TargetDecision::Reject {
      reason: "target row missing required field: name".into(),
    };
  };

  let named: Vec<Target> =
    by_name.iter().filter(|t| eq_ci(&t.name, name)).cloned().collect();
  if let Some(existing) = resolve_ambiguous(&named) {
    return TargetDecision::Update {
      ambiguous: named.len() > 1,
      existing:  existing.clone(),
    };
  }

  if let Some(website) = non_empty(&row.website) {
    let via_site: Vec<Target> = by_website
      .iter()
      .filter(|t| {
        t.website
          .as_deref()
          .is_some_and(|w| eq_ci(w, website))
      })
      .cloned()
      .collect();
    if let Some(existing) = resolve_ambiguous(&via_site) {
      return TargetDecision::Update {
        ambiguous: via_site.len() > 1,
        existing:  existing.clone(),
      };
    }
  }

  TargetDecision::Create
}

// ─── Contacts ────────────────────────────────────────────────────────────────

/// What to do with one incoming contact row, within an already-resolved
/// target.
#[derive(Debug, Clone)]
pub enum ContactDecision {
  Create,
  Update { existing: Contact },
  Reject { reason: String },
}

/// Classify an incoming contact row against the target's existing contacts.
/// Email match takes precedence over full-name match; a row with neither
/// field is rejected.
pub fn match_contact(row: &ContactRow, candidates: &[Contact]) -> ContactDecision {
  let email = non_empty(&row.email);
  let full_name = non_empty(&row.full_name);

  if email.is_none() && full_name.is_none() {
    return ContactDecision::Reject {
      reason: "contact row missing both full_name and email".into(),
    };
  }

  if let Some(email) = email
    && let Some(existing) = candidates.iter().find(|c| {
      c.email.as_deref().is_some_and(|e| eq_ci(e, email))
    })
  {
    return ContactDecision::Update { existing: existing.clone() };
  }

  if let Some(full_name) = full_name
    && let Some(existing) =
      candidates.iter().find(|c| eq_ci(&c.full_name, full_name))
  {
    return ContactDecision::Update { existing: existing.clone() };
  }

  ContactDecision::Create
}
