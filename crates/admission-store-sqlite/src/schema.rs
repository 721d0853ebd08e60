//! SQL schema for the admission SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- AUTOINCREMENT keeps ids strictly increasing and never reused, so the id
-- sequence is owned by SQLite rather than by any process.
CREATE TABLE IF NOT EXISTS applications (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    reference_number TEXT NOT NULL UNIQUE,  -- uppercase A-Z0-9
    status           TEXT NOT NULL DEFAULT 'draft',  -- 'draft' | 'submitted'
    student_photo    TEXT,                  -- base64; attached after creation
    data_json        TEXT NOT NULL,         -- remaining domain fields
    created_at       TEXT NOT NULL,         -- ISO 8601 UTC
    updated_at       TEXT NOT NULL
);

PRAGMA user_version = 1;
";
