//! HTTP JSON mail relay client.
//!
//! Live sends POST `{to, subject, body}` to the configured relay and expect
//! `{"message_id": "..."}` back. The reqwest client carries its own timeout
//! as a backstop; the governor's `tokio::time::timeout` is the authoritative
//! bound.

use std::time::Duration;

use anyhow::{Context as _, Result};
use reach_core::mailer::{Mailer, MessageId, TransportError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct RelayRequest<'a> {
  to:      &'a str,
  subject: &'a str,
  body:    &'a str,
}

#[derive(Deserialize)]
struct RelayResponse {
  message_id: String,
}

/// Mailer backed by an HTTP relay.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based. With no
/// relay URL configured every send fails; preview mode never gets that far.
#[derive(Clone)]
pub struct HttpMailer {
  client: Client,
  url:    Option<String>,
  token:  Option<String>,
}

impl HttpMailer {
  pub fn new(
    url: Option<String>,
    token: Option<String>,
    timeout: Duration,
  ) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, url, token })
  }
}

impl Mailer for HttpMailer {
  async fn send(
    &self,
    to: &str,
    subject: &str,
    body: &str,
  ) -> Result<MessageId, TransportError> {
    let Some(url) = self.url.as_deref() else {
      return Err(TransportError::Other("no mail relay configured".into()));
    };

    let mut request = self
      .client
      .post(url)
      .json(&RelayRequest { to, subject, body });
    if let Some(token) = &self.token {
      request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(|e| {
      if e.is_timeout() {
        TransportError::Timeout
      } else {
        TransportError::Other(e.to_string())
      }
    })?;

    match response.status() {
      status if status.is_success() => {
        let parsed: RelayResponse = response
          .json()
          .await
          .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(MessageId(parsed.message_id))
      }
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
        Err(TransportError::Auth(format!("relay returned {}", response.status())))
      }
      status if status.is_client_error() => {
        Err(TransportError::RecipientRejected(to.to_owned()))
      }
      status => Err(TransportError::Other(format!("relay returned {status}"))),
    }
  }
}
