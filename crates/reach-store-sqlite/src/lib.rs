//! SQLite backend for the Reach outreach store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. Import batches are applied inside
//! a single transaction; conditional writes (draft transitions, status
//! compare-and-set, the daily send counter) are single SQL statements.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
