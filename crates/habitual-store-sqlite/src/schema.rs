//! SQL schema for the Habitual SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS habits (
    habit_id     TEXT PRIMARY KEY,
    user_id      TEXT NOT NULL,
    name         TEXT NOT NULL,
    description  TEXT,
    color        TEXT,
    schedule     TEXT NOT NULL,            -- JSON-encoded ScheduleRule
    timezone     TEXT NOT NULL,            -- IANA name or fixed offset
    is_active    INTEGER NOT NULL DEFAULT 1,
    created_at   TEXT NOT NULL,            -- RFC 3339 UTC, fixed width
    updated_at   TEXT NOT NULL
);

-- Confirmations are strictly append-only.
-- The UNIQUE constraint is the only thing that serialises concurrent
-- confirmations of the same period.
CREATE TABLE IF NOT EXISTS confirmations (
    confirmation_id      TEXT PRIMARY KEY,
    habit_id             TEXT NOT NULL REFERENCES habits(habit_id),
    user_id              TEXT NOT NULL,
    confirmed_at         TEXT NOT NULL,
    confirmed_for_period TEXT NOT NULL,
    notes                TEXT,
    UNIQUE (habit_id, confirmed_for_period)
);

CREATE INDEX IF NOT EXISTS habits_user_idx ON habits(user_id);

PRAGMA user_version = 1;
";
