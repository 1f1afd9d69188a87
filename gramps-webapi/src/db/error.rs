//! Errors raised by the family tree storage layer.

use std::path::PathBuf;

use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Tree '{name}' not found in {}", dir.display())]
    TreeNotFound { name: String, dir: PathBuf },

    #[error("Tree '{0}' already exists")]
    TreeExists(String),

    #[error("Tree name must not be empty")]
    EmptyTreeName,

    #[error("Database for tree '{0}' is closed")]
    Closed(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DbError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
