//! Connection to a single family tree database.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, OpenFlags};

use super::error::{DbError, DbResult};
use super::queries::{MetadataQueries, ResearcherQueries};
use crate::models::Researcher;

/// File name of the SQLite database inside a tree directory.
pub const DB_FILE: &str = "sqlite.db";

/// Current schema version written to the metadata table.
pub const SCHEMA_VERSION: &str = "1";

/// An open family tree.
///
/// The connection lives behind a mutex so a handle can be shared by the
/// handlers of one request; `close` takes it out, after which every query
/// fails with [`DbError::Closed`].
pub struct TreeDatabase {
    id: String,
    name: String,
    conn: Mutex<Option<Connection>>,
}

impl TreeDatabase {
    /// Open an existing tree stored in `dir`.
    ///
    /// The database file must already exist; a missing file is reported
    /// instead of silently creating an empty tree.
    pub fn open_at(name: &str, dir: &Path) -> DbResult<Self> {
        let db_path = dir.join(DB_FILE);
        let conn = Connection::open_with_flags(
            &db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::from_connection(name, dir, conn))
    }

    /// Create the database file for a new tree in `dir` and initialize its schema.
    pub fn create_at(name: &str, dir: &Path) -> DbResult<Self> {
        let conn = Connection::open(dir.join(DB_FILE))?;
        initialize(&conn)?;
        Ok(Self::from_connection(name, dir, conn))
    }

    /// Open an in-memory tree with an initialized schema.
    #[cfg(test)]
    pub fn open_in_memory(name: &str) -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize(&conn)?;
        Ok(Self::from_connection(name, Path::new(":memory:"), conn))
    }

    fn from_connection(name: &str, dir: &Path, conn: Connection) -> Self {
        let id = dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            id,
            name: name.to_string(),
            conn: Mutex::new(Some(conn)),
        }
    }

    /// Display name of the tree.
    pub fn get_dbname(&self) -> &str {
        &self.name
    }

    /// Directory name identifying the tree on disk.
    pub fn get_dbid(&self) -> &str {
        &self.id
    }

    /// The researcher record, or an empty one if none was stored.
    pub fn get_researcher(&self) -> DbResult<Researcher> {
        self.with_conn(|conn| Ok(ResearcherQueries::get(conn)?.unwrap_or_default()))
    }

    pub fn set_researcher(&self, researcher: &Researcher) -> DbResult<()> {
        self.with_conn(|conn| ResearcherQueries::set(conn, researcher))
    }

    /// Read a metadata value.
    pub fn get_metadata(&self, key: &str) -> DbResult<Option<String>> {
        self.with_conn(|conn| MetadataQueries::get(conn, key))
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> DbResult<()> {
        self.with_conn(|conn| MetadataQueries::set(conn, key, value))
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Close the connection. Returns whether it was open.
    ///
    /// The connection is released even when SQLite reports an error on close.
    pub fn close(&self) -> DbResult<bool> {
        let Some(conn) = self.lock().take() else {
            return Ok(false);
        };
        conn.close().map_err(|(_conn, e)| DbError::Sqlite(e))?;
        Ok(true)
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> DbResult<T>) -> DbResult<T> {
        let guard = self.lock();
        let conn = guard
            .as_ref()
            .ok_or_else(|| DbError::Closed(self.name.clone()))?;
        f(conn)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Initialize the tree schema.
fn initialize(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS metadata (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS researcher (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            name TEXT,
            address TEXT,
            locality TEXT,
            city TEXT,
            state TEXT,
            country TEXT,
            postal TEXT,
            phone TEXT,
            email TEXT
        );
        ",
    )?;
    MetadataQueries::set(conn, "schema_version", SCHEMA_VERSION)?;
    Ok(())
}
