//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use reach_engine::{ImportError, SendError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The operation conflicts with the resource's current state (illegal
  /// draft transition, suppressed recipient, missing recipient).
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("rate limited: {0}")]
  RateLimited(String),

  /// The upstream mail transport failed; the attempt can be resubmitted.
  #[error("transport failure: {0}")]
  Transport(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

impl From<SendError> for ApiError {
  fn from(e: SendError) -> Self {
    match e {
      SendError::DraftNotFound(_) | SendError::TargetNotFound(_) => {
        Self::NotFound(e.to_string())
      }
      SendError::NotApproved(..)
      | SendError::InvalidTransition { .. }
      | SendError::NotEditable(..)
      | SendError::NoRecipient(_)
      | SendError::SuppressionBlocked(_) => Self::Conflict(e.to_string()),
      SendError::RateLimitExceeded { .. } => Self::RateLimited(e.to_string()),
      SendError::Transport(_) => Self::Transport(e.to_string()),
      SendError::Storage(inner) => Self::Store(inner),
    }
  }
}

impl From<ImportError> for ApiError {
  fn from(e: ImportError) -> Self {
    match e {
      ImportError::Storage(inner) => Self::Store(inner),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::RateLimited(m) => (StatusCode::TOO_MANY_REQUESTS, m.clone()),
      ApiError::Transport(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
