//! Family tree storage: SQLite trees on disk and the manager handing them out.

mod connection;
mod error;
mod manager;
mod queries;
mod state;
mod trees;

pub use error::{DbError, DbResult};
pub use manager::{DbManager, WebDbManager};
pub use state::DbState;
pub use trees::{create_tree, list_trees};
