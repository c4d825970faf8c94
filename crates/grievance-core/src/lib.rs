//! Core types and engines for the grievance tracker.
//!
//! No HTTP or database dependencies live here. The crate owns the complaint
//! data model, the lifecycle and escalation rules, the
//! reporting queries, and the store abstraction the other crates implement.

// Backends implement the store traits with plain `async fn`.
#![allow(async_fn_in_trait)]

pub mod actor;
pub mod complaint;
pub mod error;
pub mod escalation;
pub mod lifecycle;
pub mod notify;
pub mod report;
pub mod store;
pub mod tracker;

pub use error::{Error, Result};
