//! The outbound mail capability consumed by the send governor.
//!
//! Transport is a collaborator, not part of this system: implementations live
//! at the edges (an HTTP relay in `reach-cli`, a scripted mock in tests).

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transport-assigned identifier for a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

/// Why a transport call failed. Terminal for the attempt; the caller decides
/// whether to resubmit the draft.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
  #[error("transport timed out")]
  Timeout,

  #[error("transport authentication failed: {0}")]
  Auth(String),

  #[error("recipient rejected: {0}")]
  RecipientRejected(String),

  #[error("transport error: {0}")]
  Other(String),
}

/// Abstraction over an email transport.
///
/// One call is one attempt: no internal retry, no queueing. The governor
/// wraps the returned future in a bounded timeout.
pub trait Mailer: Send + Sync {
  fn send<'a>(
    &'a self,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
  ) -> impl Future<Output = Result<MessageId, TransportError>> + Send + 'a;
}
