//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Complaints are stored as compact JSON. Timestamps are RFC 3339 strings.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use grievance_core::complaint::Complaint;
use uuid::Uuid;

use crate::Result;

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── Complaint ────────────────────────────────────────────────────────────────

pub fn encode_complaint(c: &Complaint) -> Result<String> { Ok(serde_json::to_string(c)?) }

pub fn decode_complaint(s: &str) -> Result<Complaint> { Ok(serde_json::from_str(s)?) }

/// Surface a crate error from inside a `tokio_rusqlite` connection closure.
pub fn in_thread<T>(r: Result<T>) -> tokio_rusqlite::Result<T> {
  r.map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `complaints` row.
pub struct RawComplaint {
  pub id:   String,
  pub body: String,
}

impl RawComplaint {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { id: row.get(0)?, body: row.get(1)? })
  }

  pub fn into_complaint(self) -> Result<Complaint> { decode_complaint(&self.body) }
}
