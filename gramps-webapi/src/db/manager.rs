//! Database manager - hands out handles to family trees.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use super::connection::TreeDatabase;
use super::error::DbResult;
use super::state::DbState;
use super::trees::resolve_tree;

/// Produces database-state handles for named trees.
///
/// Every call returns a fresh handle; callers own it and are responsible
/// for closing it.
pub trait DbManager: Send + Sync {
    fn get_db(&self, tree: &str) -> DbResult<DbState>;
}

/// Counts of handles opened and closed through a manager.
#[derive(Debug, Default)]
pub struct HandleStats {
    opened: AtomicU64,
    closed: AtomicU64,
}

impl HandleStats {
    pub(crate) fn record_open(&self) {
        self.opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_close(&self) {
        self.closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn opened(&self) -> u64 {
        self.opened.load(Ordering::Relaxed)
    }

    pub fn closed(&self) -> u64 {
        self.closed.load(Ordering::Relaxed)
    }

    /// Handles opened but not yet closed.
    pub fn open_handles(&self) -> u64 {
        self.opened().saturating_sub(self.closed())
    }
}

/// Manager for the SQLite trees in one database directory.
pub struct WebDbManager {
    db_dir: PathBuf,
    /// Map of tree name -> tree directory
    trees: RwLock<HashMap<String, PathBuf>>,
    stats: Arc<HandleStats>,
}

impl WebDbManager {
    /// Create a manager for `db_dir` and resolve the tree it will serve.
    ///
    /// Fails if `tree` does not exist, so a misconfigured server never starts.
    pub fn open(db_dir: impl Into<PathBuf>, tree: &str) -> DbResult<Self> {
        let manager = Self {
            db_dir: db_dir.into(),
            trees: RwLock::new(HashMap::new()),
            stats: Arc::new(HandleStats::default()),
        };
        let path = manager.tree_path(tree)?;
        tracing::info!(tree, path = %path.display(), "Resolved family tree");
        Ok(manager)
    }

    pub fn stats(&self) -> &HandleStats {
        &self.stats
    }

    /// Get the directory for a tree, resolving and caching it on first use.
    fn tree_path(&self, tree: &str) -> DbResult<PathBuf> {
        if let Some(path) = self
            .trees
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tree)
        {
            return Ok(path.clone());
        }

        let path = resolve_tree(&self.db_dir, tree)?;
        self.trees
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tree.to_string(), path.clone());
        Ok(path)
    }
}

impl DbManager for WebDbManager {
    fn get_db(&self, tree: &str) -> DbResult<DbState> {
        let path = self.tree_path(tree)?;
        let db = TreeDatabase::open_at(tree, &path)?;
        let state = DbState::new(db, Arc::clone(&self.stats));
        tracing::debug!(
            tree,
            open_handles = self.stats.open_handles(),
            "Opened database handle"
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::trees::create_tree;
    use crate::db::DbError;
    use tempfile::tempdir;

    #[test]
    fn test_open_fails_fast_for_unknown_tree() {
        let dir = tempdir().unwrap();
        let err = WebDbManager::open(dir.path(), "ghost").err().unwrap();
        assert!(matches!(err, DbError::TreeNotFound { .. }));
    }

    #[test]
    fn test_each_get_db_is_a_fresh_handle() {
        let dir = tempdir().unwrap();
        create_tree(dir.path(), "smith_family", None).unwrap();
        let manager = WebDbManager::open(dir.path(), "smith_family").unwrap();

        let a = manager.get_db("smith_family").unwrap();
        let b = manager.get_db("smith_family").unwrap();
        assert_eq!(manager.stats().opened(), 2);
        assert_eq!(manager.stats().open_handles(), 2);

        a.close().unwrap();
        assert!(!a.is_open());
        assert!(b.is_open());

        b.close().unwrap();
        b.close().unwrap();
        assert_eq!(manager.stats().closed(), 2);
        assert_eq!(manager.stats().open_handles(), 0);
    }

    #[test]
    fn test_get_db_for_other_tree() {
        let dir = tempdir().unwrap();
        create_tree(dir.path(), "one", None).unwrap();
        create_tree(dir.path(), "two", None).unwrap();
        let manager = WebDbManager::open(dir.path(), "one").unwrap();

        let other = manager.get_db("two").unwrap();
        assert_eq!(other.db.get_dbname(), "two");
        other.close().unwrap();
        assert!(manager.get_db("three").is_err());
    }
}
