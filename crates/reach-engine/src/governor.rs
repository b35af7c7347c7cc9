//! Send governor — decides whether a send attempt goes out, and how.
//!
//! Preview mode never touches the transport. Live mode reserves a slot in
//! the daily counter before calling the mailer and releases it again on
//! failure, so only successful sends consume quota while concurrent attempts
//! still serialize on the counter row.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reach_core::{
  mailer::{Mailer, MessageId, TransportError},
  store::OutreachStore,
};
use uuid::Uuid;

use crate::error::SendError;

/// Governor settings, fixed at construction. A mode flip means building a
/// new governor; in-flight attempts keep the mode they started with.
#[derive(Debug, Clone)]
pub struct SendConfig {
  /// Simulate every send: record the event, skip the transport.
  pub preview:      bool,
  /// Hard cap on live sends per calendar day.
  pub daily_limit:  u32,
  /// Bound on a single transport call; elapsing counts as transport failure.
  pub send_timeout: Duration,
}

impl SendConfig {
  /// Preview-mode config, for drills and tests.
  pub fn preview() -> Self {
    Self {
      preview:      true,
      daily_limit:  0,
      send_timeout: Duration::from_secs(30),
    }
  }

  pub fn live(daily_limit: u32, send_timeout: Duration) -> Self {
    Self { preview: false, daily_limit, send_timeout }
  }
}

/// How a permitted attempt was carried out.
#[derive(Debug, Clone)]
pub enum Dispatch {
  /// A real transport call succeeded.
  Delivered(MessageId),
  /// Preview mode: nothing left the process.
  Simulated(MessageId),
}

impl Dispatch {
  pub fn message_id(&self) -> &MessageId {
    match self {
      Self::Delivered(id) | Self::Simulated(id) => id,
    }
  }

  pub fn is_simulated(&self) -> bool { matches!(self, Self::Simulated(_)) }
}

/// Rate-limit and mode enforcement around a [`Mailer`].
pub struct SendGovernor<S, M> {
  store:  Arc<S>,
  mailer: Arc<M>,
  config: SendConfig,
}

impl<S: OutreachStore, M: Mailer> SendGovernor<S, M> {
  pub fn new(store: Arc<S>, mailer: Arc<M>, config: SendConfig) -> Self {
    Self { store, mailer, config }
  }

  pub fn config(&self) -> &SendConfig { &self.config }

  /// Attempt one send. Exactly one of: a simulated marker (preview), a
  /// delivered message id, or a typed failure. Never retries.
  pub async fn dispatch(
    &self,
    to: &str,
    subject: &str,
    body: &str,
  ) -> Result<Dispatch, SendError> {
    if self.config.preview {
      let marker = MessageId(format!("preview-{}", Uuid::new_v4()));
      tracing::info!(recipient = %to, marker = %marker, "preview mode: send simulated");
      return Ok(Dispatch::Simulated(marker));
    }

    let today = Utc::now().date_naive();
    let reserved = self
      .store
      .try_reserve_send_slot(today, self.config.daily_limit)
      .await
      .map_err(SendError::storage)?;
    if !reserved {
      return Err(SendError::RateLimitExceeded { limit: self.config.daily_limit });
    }

    let attempt =
      tokio::time::timeout(self.config.send_timeout, self.mailer.send(to, subject, body))
        .await;

    match attempt {
      Ok(Ok(id)) => {
        tracing::info!(recipient = %to, message_id = %id, "live send delivered");
        Ok(Dispatch::Delivered(id))
      }
      Ok(Err(e)) => {
        self.release(today).await;
        Err(SendError::Transport(e))
      }
      Err(_elapsed) => {
        self.release(today).await;
        Err(SendError::Transport(TransportError::Timeout))
      }
    }
  }

  async fn release(&self, day: chrono::NaiveDate) {
    if let Err(e) = self.store.release_send_slot(day).await {
      tracing::warn!(error = %e, "failed to release reserved send slot");
    }
  }
}
