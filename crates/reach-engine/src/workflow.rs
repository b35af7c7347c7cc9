//! Draft workflow — the state machine driver for outreach drafts.
//!
//! Every transition goes through the store's conditional update, so two
//! concurrent actors cannot both move the same draft. Sending is the one
//! compound operation: suppression check, governed dispatch, event append,
//! `approved → sent`, pipeline update — in that order.

use std::sync::Arc;

use reach_core::{
  draft::{DraftState, NewDraft, OutreachDraft},
  mailer::Mailer,
  outreach::{Channel, NewEvent, Outcome, OutreachEvent},
  store::OutreachStore,
};
use uuid::Uuid;

use crate::{
  error::SendError,
  governor::{SendConfig, SendGovernor},
  pipeline::PipelineUpdater,
  suppress::SuppressionGuard,
};

pub struct DraftWorkflow<S, M> {
  store:    Arc<S>,
  guard:    SuppressionGuard<S>,
  governor: SendGovernor<S, M>,
  pipeline: PipelineUpdater<S>,
}

impl<S: OutreachStore, M: Mailer> DraftWorkflow<S, M> {
  pub fn new(store: Arc<S>, mailer: Arc<M>, config: SendConfig) -> Self {
    Self {
      guard:    SuppressionGuard::new(store.clone()),
      governor: SendGovernor::new(store.clone(), mailer, config),
      pipeline: PipelineUpdater::new(store.clone()),
      store,
    }
  }

  pub fn pipeline(&self) -> &PipelineUpdater<S> { &self.pipeline }

  // ── Plain transitions ──────────────────────────────────────────────────

  pub async fn create(&self, input: NewDraft) -> Result<OutreachDraft, SendError> {
    self.store.add_draft(input).await.map_err(SendError::storage)
  }

  /// Edit subject/body. Only legal while the draft has not been approved.
  pub async fn update_content(
    &self,
    id: Uuid,
    subject: String,
    body: String,
  ) -> Result<OutreachDraft, SendError> {
    let draft = self.fetch(id).await?;
    if !draft.state.is_editable() {
      return Err(SendError::NotEditable(id, draft.state));
    }
    self
      .store
      .update_draft_content(id, subject, body)
      .await
      .map_err(SendError::storage)
  }

  /// `draft → approved`; freezes subject/body.
  pub async fn approve(&self, id: Uuid) -> Result<OutreachDraft, SendError> {
    self.transition(id, DraftState::Draft, DraftState::Approved).await
  }

  /// `draft → rejected`; terminal, no event is produced.
  pub async fn reject(&self, id: Uuid) -> Result<OutreachDraft, SendError> {
    self.transition(id, DraftState::Draft, DraftState::Rejected).await
  }

  /// `failed → approved`; the explicit resubmission path after a rate-limit
  /// or transport failure. Never taken automatically.
  pub async fn resubmit(&self, id: Uuid) -> Result<OutreachDraft, SendError> {
    self.transition(id, DraftState::Failed, DraftState::Approved).await
  }

  async fn transition(
    &self,
    id: Uuid,
    from: DraftState,
    to: DraftState,
  ) -> Result<OutreachDraft, SendError> {
    let draft = self.fetch(id).await?;
    if draft.state != from {
      return Err(SendError::InvalidTransition { draft_id: id, from: draft.state, to });
    }
    // The store's conditional update is the backstop for races.
    self
      .store
      .transition_draft(id, from, to)
      .await
      .map_err(SendError::storage)
  }

  async fn fetch(&self, id: Uuid) -> Result<OutreachDraft, SendError> {
    self
      .store
      .get_draft(id)
      .await
      .map_err(SendError::storage)?
      .ok_or(SendError::DraftNotFound(id))
  }

  // ── Send ───────────────────────────────────────────────────────────────

  /// Send an approved draft.
  ///
  /// On success the draft is `sent`, an [`OutreachEvent`] is on the ledger
  /// and the target's pipeline status has been advanced. A suppression hit
  /// leaves the draft approved; a rate-limit or transport failure moves it
  /// to `failed` and produces no event.
  pub async fn send(&self, id: Uuid) -> Result<OutreachEvent, SendError> {
    let draft = self.fetch(id).await?;

    if draft.state != DraftState::Approved {
      return Err(SendError::NotApproved(id, draft.state));
    }

    let target = self
      .store
      .get_target(draft.target_id)
      .await
      .map_err(SendError::storage)?
      .ok_or(SendError::TargetNotFound(draft.target_id))?;

    let contact = match draft.contact_id {
      Some(contact_id) => self
        .store
        .get_contact(contact_id)
        .await
        .map_err(SendError::storage)?,
      None => None,
    };

    let recipient = contact
      .as_ref()
      .and_then(|c| c.email.clone())
      .or_else(|| target.general_email.clone())
      .ok_or(SendError::NoRecipient(id))?;

    // Absolute blocker, checked before anything is spent or mutated.
    self.guard.check(&recipient).await?;

    let dispatch = match self
      .governor
      .dispatch(&recipient, &draft.subject, &draft.body)
      .await
    {
      Ok(dispatch) => dispatch,
      Err(e @ (SendError::RateLimitExceeded { .. } | SendError::Transport(_))) => {
        // The attempt is over; park the draft for an explicit resubmission.
        self
          .store
          .transition_draft(id, DraftState::Approved, DraftState::Failed)
          .await
          .map_err(SendError::storage)?;
        return Err(e);
      }
      Err(other) => return Err(other),
    };

    let first_event = !self
      .store
      .has_events(target.target_id)
      .await
      .map_err(SendError::storage)?;

    let event = self
      .store
      .record_event(NewEvent {
        target_id:  target.target_id,
        contact_id: draft.contact_id,
        channel:    Channel::Email,
        subject:    Some(draft.subject.clone()),
        body:       draft.body.clone(),
        outcome:    Outcome::None,
        message_id: Some(dispatch.message_id().0.clone()),
      })
      .await
      .map_err(SendError::storage)?;

    self
      .store
      .transition_draft(id, DraftState::Approved, DraftState::Sent)
      .await
      .map_err(SendError::storage)?;

    self.pipeline.on_event(&target, Outcome::None, first_event).await?;

    Ok(event)
  }
}
