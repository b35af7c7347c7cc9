//! The reconciliation and controlled-send engine.
//!
//! Two pipelines live here. An import batch flows scorer → matcher → upsert
//! and commits as one transaction, yielding an
//! [`ImportReport`](reach_core::import::ImportReport). A draft flows through
//! the [`workflow::DraftWorkflow`] state machine, which consults the
//! [`suppress::SuppressionGuard`] and [`governor::SendGovernor`] before any
//! transport call and feeds successful sends to the pipeline updater.
//!
//! Everything is generic over [`reach_core::store::OutreachStore`] and
//! [`reach_core::mailer::Mailer`]; no storage or transport specifics leak in.

pub mod error;
pub mod export;
pub mod governor;
pub mod importer;
pub mod matcher;
pub mod pipeline;
pub mod roles;
pub mod suppress;
pub mod workflow;

pub use error::{ImportError, SendError};
pub use governor::{SendConfig, SendGovernor};
pub use importer::Importer;
pub use suppress::SuppressionGuard;
pub use workflow::DraftWorkflow;

#[cfg(test)]
mod tests;
