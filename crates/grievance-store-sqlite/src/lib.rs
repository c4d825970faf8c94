//! SQLite backend for the grievance complaint store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on one dedicated
//! connection thread without blocking the async runtime. That thread is the
//! store's single writer: every read-modify-write runs there inside its own
//! transaction.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
