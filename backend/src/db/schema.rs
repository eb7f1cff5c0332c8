//! Table definitions for the lead store.

use log::info;
use rusqlite::Connection;

use crate::error::AppError;

/// Bumped whenever the table layout changes.
pub const SCHEMA_VERSION: i32 = 1;

const MEMBERS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS members (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name         TEXT    NOT NULL,
    email             TEXT    NOT NULL UNIQUE,
    gender            TEXT,
    consent_to_emails INTEGER NOT NULL DEFAULT 1,
    focus_areas       TEXT,
    source_page       TEXT,
    ip_address        TEXT,
    country_code      TEXT,
    created_at        TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_members_created_at ON members(created_at);
"#;

const BIRTH_DATA_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS member_birth_data (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id     INTEGER NOT NULL UNIQUE REFERENCES members(id),
    date_of_birth TEXT    NOT NULL,
    time_of_birth TEXT,
    birth_city    TEXT,
    time_zone     TEXT
);
"#;

const ENERGY_MAP_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS energy_map (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id   INTEGER NOT NULL UNIQUE REFERENCES members(id),
    energy_type TEXT    NOT NULL,
    notes       TEXT,
    created_at  TEXT    NOT NULL
);
"#;

/// Creates any missing tables. Safe to call on every startup.
pub fn init_schema(conn: &Connection) -> Result<(), AppError> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    let current: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if current == SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current);
    } else {
        info!("Creating database schema v{} (found v{})", SCHEMA_VERSION, current);
    }

    conn.execute_batch(MEMBERS_SCHEMA)?;
    conn.execute_batch(BIRTH_DATA_SCHEMA)?;
    conn.execute_batch(ENERGY_MAP_SCHEMA)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

    Ok(())
}
