//! Upsert engine — turns raw import rows into one committed batch.
//!
//! For each row the engine consults the matcher against a snapshot of
//! candidates (plus entities already pending in this batch), merges fields
//! under the "non-empty incoming wins" rule, and accumulates an
//! [`ImportPlan`]. The store applies the plan as a single transaction;
//! every batch leaves exactly one [`ImportLog`](reach_core::import::ImportLog)
//! row behind, even a fully failed one.

use std::sync::Arc;

use chrono::Utc;
use reach_core::{
  contact::{Contact, confidence_for},
  import::{ContactRow, ImportKind, ImportPlan, ImportReport, TargetRow, VersionedUpdate},
  store::OutreachStore,
  target::{Target, TargetKind, TargetStatus},
};
use uuid::Uuid;

use crate::{
  error::ImportError,
  matcher::{self, ContactDecision, TargetDecision, eq_ci},
  roles,
};

fn clean(value: &Option<String>) -> Option<String> {
  value
    .as_deref()
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(ToOwned::to_owned)
}

/// Non-empty incoming wins, else keep existing. Returns whether the field
/// actually changed.
fn merge_field(incoming: &Option<String>, existing: &mut Option<String>) -> bool {
  if let Some(value) = clean(incoming)
    && existing.as_deref() != Some(value.as_str())
  {
    *existing = Some(value);
    return true;
  }
  false
}

fn merge_target_row(target: &mut Target, row: &TargetRow) -> bool {
  let mut changed = false;

  if let Some(name) = clean(&row.name)
    && target.name != name
  {
    target.name = name;
    changed = true;
  }
  if let Some(kind) = row.kind
    && target.kind != kind
  {
    target.kind = kind;
    changed = true;
  }
  changed |= merge_field(&row.sector, &mut target.sector);
  changed |= merge_field(&row.province, &mut target.province);
  changed |= merge_field(&row.website, &mut target.website);
  changed |= merge_field(&row.general_email, &mut target.general_email);
  changed |= merge_field(&row.phone, &mut target.phone);
  changed |= merge_field(&row.source, &mut target.source);
  changed |= merge_field(&row.notes, &mut target.notes);

  changed
}

fn merge_contact_row(contact: &mut Contact, row: &ContactRow) -> bool {
  let mut changed = false;

  if let Some(name) = clean(&row.full_name)
    && contact.full_name != name
  {
    contact.full_name = name;
    changed = true;
  }

  let role_before = contact.role.clone();
  changed |= merge_field(&row.role, &mut contact.role);
  if contact.role != role_before {
    contact.role_en = contact.role.as_deref().and_then(roles::translate_role);
  }

  changed |= merge_field(&row.email, &mut contact.email);
  changed |= merge_field(&row.phone, &mut contact.phone);
  changed |= merge_field(&row.linkedin_url, &mut contact.linkedin_url);

  let confidence =
    confidence_for(contact.email.as_deref(), contact.role.as_deref());
  if contact.confidence != confidence {
    contact.confidence = confidence;
    changed = true;
  }

  changed
}

/// A row earlier in the batch may already carry this target; later rows merge
/// into the pending entity instead of creating a duplicate or issuing a
/// second conditional update against the same stored row.
fn find_pending_target<'a>(
  plan: &'a mut ImportPlan,
  name: &str,
  website: Option<&str>,
) -> Option<&'a mut Target> {
  if let Some(i) = plan.insert_targets.iter().position(|t| eq_ci(&t.name, name)) {
    return Some(&mut plan.insert_targets[i]);
  }
  if let Some(i) =
    plan.update_targets.iter().position(|u| eq_ci(&u.row.name, name))
  {
    return Some(&mut plan.update_targets[i].row);
  }
  if let Some(site) = website {
    if let Some(i) = plan.insert_targets.iter().position(|t| {
      t.website.as_deref().is_some_and(|w| eq_ci(w, site))
    }) {
      return Some(&mut plan.insert_targets[i]);
    }
    if let Some(i) = plan.update_targets.iter().position(|u| {
      u.row.website.as_deref().is_some_and(|w| eq_ci(w, site))
    }) {
      return Some(&mut plan.update_targets[i].row);
    }
  }
  None
}

fn find_pending_contact<'a>(
  plan: &'a mut ImportPlan,
  target_id: Uuid,
  email: Option<&str>,
  full_name: Option<&str>,
) -> Option<&'a mut Contact> {
  if let Some(email) = email {
    let by_email = |c: &Contact| {
      c.target_id == target_id
        && c.email.as_deref().is_some_and(|e| eq_ci(e, email))
    };
    if let Some(i) = plan.insert_contacts.iter().position(|c| by_email(c)) {
      return Some(&mut plan.insert_contacts[i]);
    }
    if let Some(i) = plan.update_contacts.iter().position(|u| by_email(&u.row)) {
      return Some(&mut plan.update_contacts[i].row);
    }
  }
  if let Some(name) = full_name {
    let by_name = |c: &Contact| {
      c.target_id == target_id && eq_ci(&c.full_name, name)
    };
    if let Some(i) = plan.insert_contacts.iter().position(|c| by_name(c)) {
      return Some(&mut plan.insert_contacts[i]);
    }
    if let Some(i) = plan.update_contacts.iter().position(|u| by_name(&u.row)) {
      return Some(&mut plan.update_contacts[i].row);
    }
  }
  None
}

// ─── Importer ────────────────────────────────────────────────────────────────

/// Batch importer over any [`OutreachStore`].
pub struct Importer<S> {
  store: Arc<S>,
}

impl<S: OutreachStore> Importer<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Import a batch of target rows. `default_kind` applies to rows that do
  /// not carry their own `type` column.
  pub async fn import_targets(
    &self,
    rows: Vec<TargetRow>,
    default_kind: TargetKind,
  ) -> Result<ImportReport, ImportError> {
    let mut report = ImportReport::default();
    let mut plan = ImportPlan::default();
    let now = Utc::now();

    for (idx, row) in rows.iter().enumerate() {
      let Some(name) = clean(&row.name) else {
        report.failed += 1;
        report
          .errors
          .push(format!("row {}: target row missing required field: name", idx + 1));
        continue;
      };
      let website = clean(&row.website);

      if let Some(pending) =
        find_pending_target(&mut plan, &name, website.as_deref())
      {
        if merge_target_row(pending, row) {
          report.updated += 1;
        } else {
          report.skipped += 1;
        }
        continue;
      }

      let by_name = self
        .store
        .find_targets_by_name(&name)
        .await
        .map_err(ImportError::storage)?;
      let by_website = match website.as_deref() {
        Some(site) => self
          .store
          .find_targets_by_website(site)
          .await
          .map_err(ImportError::storage)?,
        None => Vec::new(),
      };

      match matcher::match_target(row, &by_name, &by_website) {
        TargetDecision::Create => {
          plan.insert_targets.push(Target {
            target_id:     Uuid::new_v4(),
            name,
            kind:          row.kind.unwrap_or(default_kind),
            sector:        clean(&row.sector),
            province:      clean(&row.province),
            website,
            general_email: clean(&row.general_email),
            phone:         clean(&row.phone),
            source:        clean(&row.source),
            notes:         clean(&row.notes),
            status:        TargetStatus::New,
            created_at:    now,
            updated_at:    Some(now),
          });
          report.inserted += 1;
        }
        TargetDecision::Update { existing, ambiguous } => {
          if ambiguous {
            tracing::warn!(
              name = %name,
              merged_into = %existing.target_id,
              "multiple targets matched by name; merging into oldest"
            );
            report.warnings.push(format!(
              "row {}: multiple targets named {name:?}; merged into oldest",
              idx + 1
            ));
          }
          // An earlier row may have reached this stored row through another
          // key; never queue two conditional updates against one row.
          if let Some(pending) = plan
            .update_targets
            .iter_mut()
            .find(|u| u.row.target_id == existing.target_id)
          {
            if merge_target_row(&mut pending.row, row) {
              report.updated += 1;
            } else {
              report.skipped += 1;
            }
            continue;
          }
          let mut merged = existing.clone();
          if merge_target_row(&mut merged, row) {
            merged.updated_at = Some(now);
            plan.update_targets.push(VersionedUpdate {
              row:                 merged,
              expected_updated_at: existing.updated_at,
            });
            report.updated += 1;
          } else {
            report.skipped += 1;
          }
        }
        TargetDecision::Reject { reason } => {
          report.failed += 1;
          report.errors.push(format!("row {}: {reason}", idx + 1));
        }
      }
    }

    self.commit(ImportKind::Targets, plan, report, rows.len()).await
  }

  /// Import a batch of contact rows. Each row must resolve to an existing
  /// target by id or name; orphans are counted as failed.
  pub async fn import_contacts(
    &self,
    rows: Vec<ContactRow>,
  ) -> Result<ImportReport, ImportError> {
    let mut report = ImportReport::default();
    let mut plan = ImportPlan::default();
    let now = Utc::now();

    for (idx, row) in rows.iter().enumerate() {
      let full_name = clean(&row.full_name);
      let email = clean(&row.email);

      let Some(target) = self.resolve_target(row).await? else {
        report.failed += 1;
        report.errors.push(format!(
          "row {}: contact row does not resolve to an existing target",
          idx + 1
        ));
        continue;
      };

      if full_name.is_none() && email.is_none() {
        report.failed += 1;
        report.errors.push(format!(
          "row {}: contact row missing both full_name and email",
          idx + 1
        ));
        continue;
      }

      if let Some(pending) = find_pending_contact(
        &mut plan,
        target.target_id,
        email.as_deref(),
        full_name.as_deref(),
      ) {
        if merge_contact_row(pending, row) {
          report.updated += 1;
        } else {
          report.skipped += 1;
        }
        continue;
      }

      let candidates = self
        .store
        .list_contacts(target.target_id)
        .await
        .map_err(ImportError::storage)?;

      match matcher::match_contact(row, &candidates) {
        ContactDecision::Create => {
          let role = clean(&row.role);
          plan.insert_contacts.push(Contact {
            contact_id:   Uuid::new_v4(),
            target_id:    target.target_id,
            full_name:    full_name
              .clone()
              .or_else(|| email.clone())
              .unwrap_or_else(|| "Unknown".into()),
            role_en:      role.as_deref().and_then(roles::translate_role),
            confidence:   confidence_for(email.as_deref(), role.as_deref()),
            role,
            email,
            phone:        clean(&row.phone),
            linkedin_url: clean(&row.linkedin_url),
            created_at:   now,
            updated_at:   Some(now),
          });
          report.inserted += 1;
        }
        ContactDecision::Update { existing } => {
          if let Some(pending) = plan
            .update_contacts
            .iter_mut()
            .find(|u| u.row.contact_id == existing.contact_id)
          {
            if merge_contact_row(&mut pending.row, row) {
              report.updated += 1;
            } else {
              report.skipped += 1;
            }
            continue;
          }
          let mut merged = existing.clone();
          if merge_contact_row(&mut merged, row) {
            merged.updated_at = Some(now);
            plan.update_contacts.push(VersionedUpdate {
              row:                 merged,
              expected_updated_at: existing.updated_at,
            });
            report.updated += 1;
          } else {
            report.skipped += 1;
          }
        }
        ContactDecision::Reject { reason } => {
          report.failed += 1;
          report.errors.push(format!("row {}: {reason}", idx + 1));
        }
      }
    }

    self.commit(ImportKind::Contacts, plan, report, rows.len()).await
  }

  /// Resolve the owning target: explicit id first, then name (oldest match
  /// wins, matching the ambiguity policy).
  async fn resolve_target(
    &self,
    row: &ContactRow,
  ) -> Result<Option<Target>, ImportError> {
    if let Some(id) = row.target_id
      && let Some(target) =
        self.store.get_target(id).await.map_err(ImportError::storage)?
    {
      return Ok(Some(target));
    }
    if let Some(name) = clean(&row.target_name) {
      let candidates = self
        .store
        .find_targets_by_name(&name)
        .await
        .map_err(ImportError::storage)?;
      return Ok(candidates.into_iter().next());
    }
    Ok(None)
  }

  /// Commit the plan as one transaction. On a storage failure the batch has
  /// rolled back; record the attempt as fully failed so the audit trail
  /// still gets its one row.
  async fn commit(
    &self,
    kind: ImportKind,
    plan: ImportPlan,
    report: ImportReport,
    total_rows: usize,
  ) -> Result<ImportReport, ImportError> {
    match self.store.apply_import(kind, plan, &report).await {
      Ok(log) => {
        tracing::info!(
          kind = %kind,
          inserted = report.inserted,
          updated = report.updated,
          skipped = report.skipped,
          failed = report.failed,
          log = %log.import_log_id,
          "import batch committed"
        );
        Ok(report)
      }
      Err(e) => {
        let failed = ImportReport {
          failed: total_rows as u32,
          errors: vec![e.to_string()],
          ..Default::default()
        };
        if let Err(log_err) =
          self.store.apply_import(kind, ImportPlan::default(), &failed).await
        {
          tracing::warn!(error = %log_err, "could not record all-failed import log");
        }
        Err(ImportError::storage(e))
      }
    }
  }
}
