//! Database-state handle handed out by a [`DbManager`](super::DbManager).

use std::sync::Arc;

use super::connection::TreeDatabase;
use super::error::DbResult;
use super::manager::HandleStats;

/// An open session to one named family tree.
///
/// Closing goes through the handle so the manager's accounting sees it.
pub struct DbState {
    pub db: TreeDatabase,
    stats: Arc<HandleStats>,
}

impl DbState {
    pub(crate) fn new(db: TreeDatabase, stats: Arc<HandleStats>) -> Self {
        stats.record_open();
        Self { db, stats }
    }

    pub fn is_open(&self) -> bool {
        self.db.is_open()
    }

    /// Close the underlying database. Closing a closed handle does nothing.
    pub fn close(&self) -> DbResult<()> {
        // SQLite releases the connection even when close reports an error
        let result = self.db.close();
        if !matches!(result, Ok(false)) {
            self.stats.record_close();
            tracing::debug!(
                tree = self.db.get_dbname(),
                open_handles = self.stats.open_handles(),
                "Closed database handle"
            );
        }
        result.map(|_| ())
    }
}
