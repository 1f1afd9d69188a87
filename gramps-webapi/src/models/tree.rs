//! Summary of a family tree stored on disk.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A family tree found in the database directory.
#[derive(Debug, Clone, Serialize)]
pub struct TreeInfo {
    /// Directory name of the tree (generated on creation).
    pub id: String,
    /// Display name, read from `name.txt`.
    pub name: String,
    /// Tree directory.
    pub path: PathBuf,
    /// When the tree was created, if recorded.
    pub created_at: Option<DateTime<Utc>>,
}
