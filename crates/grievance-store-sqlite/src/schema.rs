//! SQL schema for the grievance SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per complaint. `body` is the complete record as JSON in the
-- camelCase wire contract. `seq` is the position in the collection; new rows
-- take max(seq) + 1 and full rewrites renumber from 1.
CREATE TABLE IF NOT EXISTS complaints (
    seq   INTEGER PRIMARY KEY,
    id    TEXT NOT NULL UNIQUE,
    body  TEXT NOT NULL
);

-- Citizen accounts. Passwords are only ever stored as argon2 PHC strings.
CREATE TABLE IF NOT EXISTS accounts (
    email          TEXT PRIMARY KEY,
    password_hash  TEXT NOT NULL,
    created_at     TEXT NOT NULL   -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
