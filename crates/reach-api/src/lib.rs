//! JSON REST API for Reach.
//!
//! Exposes an axum [`Router`] backed by any
//! [`reach_core::store::OutreachStore`] and [`reach_core::mailer::Mailer`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", reach_api::api_router(state))
//! ```

pub mod dnc;
pub mod drafts;
pub mod error;
pub mod events;
pub mod export;
pub mod imports;
pub mod targets;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use reach_core::{mailer::Mailer, store::OutreachStore};
use reach_engine::{DraftWorkflow, Importer};

pub use error::ApiError;

/// Shared handler state: the store plus the two engines built over it.
pub struct AppState<S, M> {
  pub store:    Arc<S>,
  pub importer: Arc<Importer<S>>,
  pub workflow: Arc<DraftWorkflow<S, M>>,
}

// Manual impl: `S`/`M` themselves need not be `Clone` behind the `Arc`s.
impl<S, M> Clone for AppState<S, M> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      importer: self.importer.clone(),
      workflow: self.workflow.clone(),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, M>(state: AppState<S, M>) -> Router<()>
where
  S: OutreachStore + 'static,
  M: Mailer + 'static,
{
  Router::new()
    // Targets
    .route(
      "/targets",
      get(targets::list::<S, M>).post(targets::create::<S, M>),
    )
    .route("/targets/{id}", get(targets::get_one::<S, M>))
    .route("/targets/{id}/status", post(targets::set_status::<S, M>))
    .route(
      "/targets/{id}/contacts",
      get(targets::list_contacts::<S, M>).post(targets::add_contact::<S, M>),
    )
    .route("/targets/{id}/events", get(targets::list_events::<S, M>))
    .route(
      "/targets/{id}/followups",
      get(targets::list_followups::<S, M>).post(targets::add_followup::<S, M>),
    )
    .route("/followups/{id}/done", post(targets::followup_done::<S, M>))
    // Import batches
    .route("/imports/targets", post(imports::import_targets::<S, M>))
    .route("/imports/contacts", post(imports::import_contacts::<S, M>))
    .route("/imports", get(imports::list_logs::<S, M>))
    // Drafts
    .route(
      "/drafts",
      get(drafts::list::<S, M>).post(drafts::create::<S, M>),
    )
    .route(
      "/drafts/{id}",
      get(drafts::get_one::<S, M>).put(drafts::update_content::<S, M>),
    )
    .route("/drafts/{id}/approve", post(drafts::approve::<S, M>))
    .route("/drafts/{id}/reject", post(drafts::reject::<S, M>))
    .route("/drafts/{id}/resubmit", post(drafts::resubmit::<S, M>))
    .route("/drafts/{id}/send", post(drafts::send::<S, M>))
    // Events
    .route("/events/{id}/outcome", post(events::record_outcome::<S, M>))
    // Do-not-contact registry
    .route("/dnc", get(dnc::list::<S, M>).post(dnc::create::<S, M>))
    // Export
    .route("/export/targets", get(export::targets_csv::<S, M>))
    // Liveness
    .route("/health", get(health))
    .with_state(state)
}

async fn health() -> axum::Json<serde_json::Value> {
  axum::Json(serde_json::json!({ "status": "ok" }))
}
