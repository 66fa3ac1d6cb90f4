//! SQL schema for the roster SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS persons (
    person_id      TEXT PRIMARY KEY,
    name           TEXT NOT NULL,   -- short display name; listing order
    kind           TEXT NOT NULL,   -- 'athlete' | 'security_agent' | 'employee'
    category       TEXT NOT NULL,   -- squad, agent type or staff function
    profile_json   TEXT NOT NULL,   -- JSON-encoded Profile
    photo_json     TEXT,            -- JSON-encoded PhotoRef or NULL
    assignments    TEXT NOT NULL DEFAULT '[]',
    submission_key TEXT UNIQUE,     -- client idempotency key
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

-- person_id is a soft reference: deleting a person leaves its stories.
CREATE TABLE IF NOT EXISTS stories (
    story_id    TEXT PRIMARY KEY,
    person_id   TEXT NOT NULL,
    text        TEXT NOT NULL,
    quote       TEXT,
    photo_json  TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS persons_name_idx     ON persons(name);
CREATE INDEX IF NOT EXISTS persons_category_idx ON persons(category);
CREATE INDEX IF NOT EXISTS stories_person_idx   ON stories(person_id);

PRAGMA user_version = 1;
";
