//! SQLite-backed lead store.
//!
//! A single connection is shared behind a `Mutex`. Handlers never touch it
//! on the async executor; they go through [`run_blocking`], which moves the
//! work onto actix's blocking thread pool.
//!
//! ## Tables
//!
//! - `members` - one row per unique email
//! - `member_birth_data` - birth details, one row per member
//! - `energy_map` - derived zodiac sign, one row per member

pub mod members;
pub mod schema;

use std::path::Path;
use std::sync::Mutex;

use actix_web::web;
use log::{debug, info};
use rusqlite::Connection;

use crate::error::AppError;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens (creating if needed) the database file and makes sure the
    /// schema exists. `:memory:` opens a private in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        if path == Path::new(":memory:") {
            return Self::open_in_memory();
        }

        info!("Opening SQLite database at {:?}", path);
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        debug!("Opening in-memory SQLite database");
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, AppError> {
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Exclusive access to the connection; a transaction needs `&mut`.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Connection) -> Result<T, AppError>,
    {
        let mut conn = self.conn.lock().map_err(|_| AppError::Poisoned)?;
        f(&mut conn)
    }
}

/// Runs `f` against the shared connection on the blocking pool.
pub async fn run_blocking<F, T>(db: &web::Data<Database>, f: F) -> Result<T, AppError>
where
    F: FnOnce(&mut Connection) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let db = db.clone();
    web::block(move || db.with_conn(f)).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_database_keeps_rows_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.db");

        {
            let db = Database::open(&path).unwrap();
            db.with_conn(|conn| {
                conn.execute(
                    "INSERT INTO members (full_name, email, created_at) \
                     VALUES ('A', 'a@x.com', '2024-01-01T00:00:00Z')",
                    [],
                )?;
                Ok(())
            })
            .unwrap();
        }

        let db = Database::open(&path).unwrap();
        let count: i64 = db
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM members", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn memory_path_opens_in_memory() {
        let db = Database::open(":memory:").unwrap();
        let count: i64 = db
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM members", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(count, 0);
    }
}
