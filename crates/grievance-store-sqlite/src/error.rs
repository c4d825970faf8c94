//! Error type for `grievance-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A complaint with this id is already stored.
  #[error("duplicate complaint id: {0}")]
  DuplicateComplaint(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
