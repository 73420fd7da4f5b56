//! SQL schema for the evaluation calendar SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS teachers (
    uid           TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL      -- argon2 PHC string
);

-- rowid doubles as insertion order.
CREATE TABLE IF NOT EXISTS evaluations (
    id             TEXT PRIMARY KEY,
    date_ts        INTEGER NOT NULL, -- Unix seconds at 00:00 UTC of the date
    subject        TEXT NOT NULL,    -- catalog display label
    course         TEXT NOT NULL,
    content        TEXT NOT NULL,
    instrument     TEXT NOT NULL,
    instrument_url TEXT NOT NULL DEFAULT '',
    creator_id     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS evaluations_date_idx    ON evaluations(date_ts);
CREATE INDEX IF NOT EXISTS evaluations_creator_idx ON evaluations(creator_id);

PRAGMA user_version = 1;
";
