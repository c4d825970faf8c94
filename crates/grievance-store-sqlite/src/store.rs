//! [`SqliteStore`], the SQLite implementation of [`ComplaintStore`].

use std::{collections::HashSet, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use grievance_core::{
  complaint::Complaint,
  store::{AccountStore, ComplaintStore},
};

use crate::{
  encode::{RawComplaint, decode_complaint, encode_complaint, encode_dt, encode_uuid, in_thread},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A complaint store backed by a single SQLite file.
///
/// Clones share the inner connection and funnel into the same connection
/// thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Raw `(id, body)` pairs in collection order, exactly as persisted.
  #[cfg(test)]
  pub(crate) async fn raw_rows(&self) -> Result<Vec<(String, String)>> {
    let raws = self.conn.call(|conn| Ok(read_raw(conn)?)).await?;
    Ok(raws.into_iter().map(|r| (r.id, r.body)).collect())
  }
}

fn read_raw(conn: &rusqlite::Connection) -> rusqlite::Result<Vec<RawComplaint>> {
  let mut stmt = conn.prepare("SELECT id, body FROM complaints ORDER BY seq")?;
  stmt
    .query_map([], RawComplaint::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

// ─── ComplaintStore impl ─────────────────────────────────────────────────────

impl ComplaintStore for SqliteStore {
  type Error = Error;

  // ── Whole collection ──────────────────────────────────────────────────────

  async fn load(&self) -> Result<Vec<Complaint>> {
    let raws = self.conn.call(|conn| Ok(read_raw(conn)?)).await?;
    raws.into_iter().map(RawComplaint::into_complaint).collect()
  }

  async fn save(&self, complaints: Vec<Complaint>) -> Result<()> {
    let mut seen = HashSet::new();
    if let Some(dup) = complaints.iter().find(|c| !seen.insert(c.id)) {
      return Err(Error::DuplicateComplaint(dup.id));
    }

    let rows = complaints
      .iter()
      .map(|c| Ok((encode_uuid(c.id), encode_complaint(c)?)))
      .collect::<Result<Vec<_>>>()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM complaints", [])?;
        {
          let mut stmt =
            tx.prepare("INSERT INTO complaints (seq, id, body) VALUES (?1, ?2, ?3)")?;
          for (seq, (id, body)) in (1_i64..).zip(&rows) {
            stmt.execute(rusqlite::params![seq, id, body])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Single records ────────────────────────────────────────────────────────

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Complaint>> {
    let id_str = encode_uuid(id);

    let body: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT body FROM complaints WHERE id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    body.as_deref().map(decode_complaint).transpose()
  }

  async fn insert(&self, complaint: Complaint) -> Result<()> {
    let id     = complaint.id;
    let id_str = encode_uuid(id);
    let body   = encode_complaint(&complaint)?;

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row(
            "SELECT 1 FROM complaints WHERE id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if exists {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO complaints (seq, id, body)
           VALUES ((SELECT COALESCE(MAX(seq), 0) + 1 FROM complaints), ?1, ?2)",
          rusqlite::params![id_str, body],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateComplaint(id));
    }
    Ok(())
  }

  async fn modify<T, F>(&self, id: Uuid, f: F) -> Result<Option<(Complaint, T)>>
  where
    F: FnOnce(&mut Complaint) -> T + Send + 'static,
    T: Send + 'static,
  {
    let id_str = encode_uuid(id);

    let out = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let body: Option<String> = tx
          .query_row(
            "SELECT body FROM complaints WHERE id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?;
        let Some(body) = body else {
          return Ok(None);
        };

        let mut complaint = in_thread(decode_complaint(&body))?;
        let output = f(&mut complaint);
        let new_body = in_thread(encode_complaint(&complaint))?;

        tx.execute(
          "UPDATE complaints SET body = ?2 WHERE id = ?1",
          rusqlite::params![id_str, new_body],
        )?;
        tx.commit()?;
        Ok(Some((complaint, output)))
      })
      .await?;

    Ok(out)
  }

  async fn modify_all<T, F>(&self, f: F) -> Result<Vec<T>>
  where
    F: FnOnce(&mut [Complaint]) -> Vec<T> + Send + 'static,
    T: Send + 'static,
  {
    let out = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raws = read_raw(&tx)?;
        let mut all = in_thread(
          raws
            .iter()
            .map(|r| decode_complaint(&r.body))
            .collect::<Result<Vec<_>>>(),
        )?;

        let changes = f(&mut all);
        if changes.is_empty() {
          return Ok(changes);
        }

        {
          let mut stmt = tx.prepare("UPDATE complaints SET body = ?2 WHERE id = ?1")?;
          for (raw, complaint) in raws.iter().zip(&all) {
            let body = in_thread(encode_complaint(complaint))?;
            if body != raw.body {
              stmt.execute(rusqlite::params![raw.id, body])?;
            }
          }
        }
        tx.commit()?;
        Ok(changes)
      })
      .await?;
    Ok(out)
  }
}

// ─── AccountStore impl ───────────────────────────────────────────────────────

impl AccountStore for SqliteStore {
  async fn create_account(&self, email: String, password_hash: String) -> Result<bool> {
    let at_str = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO accounts (email, password_hash, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![email, password_hash, at_str],
        )?)
      })
      .await?;

    Ok(changed == 1)
  }

  async fn password_hash(&self, email: String) -> Result<Option<String>> {
    let hash = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT password_hash FROM accounts WHERE email = ?1",
            rusqlite::params![email],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;
    Ok(hash)
  }
}
