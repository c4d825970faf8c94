//! The `ComplaintStore` trait and its credential-storage extension.
//!
//! The traits are implemented by storage backends (e.g.
//! `grievance-store-sqlite`). The tracker and the HTTP layer depend on this
//! abstraction, not on any concrete backend.
//!
//! Callers observe whole-collection semantics: a complaint list is always
//! either fully before or fully after any write. Backends must serialise
//! writers so that a read-modify-write never interleaves with another.

use std::future::Future;

use uuid::Uuid;

use crate::complaint::Complaint;

// ─── Complaints ──────────────────────────────────────────────────────────────

/// Abstraction over a complaint store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ComplaintStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Whole collection ──────────────────────────────────────────────────

  /// Every complaint, in insertion order. An empty store yields an empty
  /// list rather than an error.
  fn load(&self) -> impl Future<Output = Result<Vec<Complaint>, Self::Error>> + Send + '_;

  /// Replace the persisted collection with `complaints`, preserving their
  /// order. Fails without writing anything if two records share an id.
  fn save(
    &self,
    complaints: Vec<Complaint>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Single records ────────────────────────────────────────────────────

  /// Retrieve a complaint by id. Returns `None` if not found.
  fn find_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Complaint>, Self::Error>> + Send + '_;

  /// Append a new complaint. Fails if its id is already taken.
  fn insert(
    &self,
    complaint: Complaint,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Atomically read, mutate and write back one complaint.
  ///
  /// Returns `None` (and writes nothing) if `id` does not resolve; otherwise
  /// the complaint as written together with whatever `f` returned.
  fn modify<T, F>(
    &self,
    id: Uuid,
    f: F,
  ) -> impl Future<Output = Result<Option<(Complaint, T)>, Self::Error>> + Send + '_
  where
    F: FnOnce(&mut Complaint) -> T + Send + 'static,
    T: Send + 'static;

  /// Atomically read, mutate and write back the whole collection.
  ///
  /// `f` reports the changes it made; the collection is written back only if
  /// that list is non-empty.
  fn modify_all<T, F>(&self, f: F) -> impl Future<Output = Result<Vec<T>, Self::Error>> + Send + '_
  where
    F: FnOnce(&mut [Complaint]) -> Vec<T> + Send + 'static,
    T: Send + 'static;
}

// ─── Accounts ────────────────────────────────────────────────────────────────

/// Citizen credentials kept alongside complaints, sharing the backend and its
/// error type. Only password hashes are ever stored.
pub trait AccountStore: ComplaintStore {
  /// Record a new account. Returns `false` if the email is already taken.
  fn create_account(
    &self,
    email: String,
    password_hash: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// The stored PHC hash for `email`, if the account exists.
  fn password_hash(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;
}
