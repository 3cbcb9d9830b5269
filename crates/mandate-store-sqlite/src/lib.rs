//! SQLite backend for the mandate version store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. That single worker thread is
//! also what serializes commits: every commit is one closure running one
//! transaction, so two commits can never observe the same previous current
//! version.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
