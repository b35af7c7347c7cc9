//! Server configuration, read from `config.toml` and `REACH_*` environment
//! variables.

use std::{path::PathBuf, time::Duration};

use reach_engine::SendConfig;
use serde::Deserialize;

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { "outreach.db".into() }
fn default_preview() -> bool { true }
fn default_daily_limit() -> u32 { 25 }
fn default_send_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host: String,

  #[serde(default = "default_port")]
  pub port: u16,

  /// Path to the SQLite database file.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,

  /// Simulate all sends. On by default: going live is an explicit choice.
  #[serde(default = "default_preview")]
  pub preview_mode: bool,

  /// Hard cap on live sends per calendar day.
  #[serde(default = "default_daily_limit")]
  pub daily_send_limit: u32,

  /// Bound on a single transport call, in seconds.
  #[serde(default = "default_send_timeout")]
  pub send_timeout_secs: u64,

  /// HTTP mail relay endpoint. Required when `preview_mode` is off.
  #[serde(default)]
  pub mailer_url: Option<String>,

  /// Bearer token for the relay, if it wants one.
  #[serde(default)]
  pub mailer_token: Option<String>,
}

impl ServerConfig {
  pub fn send_config(&self) -> SendConfig {
    SendConfig {
      preview:      self.preview_mode,
      daily_limit:  self.daily_send_limit,
      send_timeout: Duration::from_secs(self.send_timeout_secs),
    }
  }
}
