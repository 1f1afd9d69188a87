//! On-disk layout of family trees.
//!
//! Every tree is a subdirectory of the database directory:
//!
//! ```text
//! <database dir>/<tree id>/name.txt      display name
//! <database dir>/<tree id>/database.txt  storage backend id
//! <database dir>/<tree id>/sqlite.db     tree data
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use super::connection::TreeDatabase;
use super::error::{DbError, DbResult};
use super::queries::parse_timestamp;
use crate::models::{Researcher, TreeInfo};

const NAME_FILE: &str = "name.txt";
const BACKEND_FILE: &str = "database.txt";
const BACKEND: &str = "sqlite";

/// Read the display name of a tree directory, if it is one.
fn read_tree_name(dir: &Path) -> Option<String> {
    let name = fs::read_to_string(dir.join(NAME_FILE)).ok()?;
    Some(name.trim().to_string())
}

/// Tree directories below `db_dir` paired with their names.
fn tree_dirs(db_dir: &Path) -> DbResult<Vec<(PathBuf, String)>> {
    let entries = match fs::read_dir(db_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(DbError::io(db_dir, e)),
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| DbError::io(db_dir, e))?.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(name) = read_tree_name(&path) {
            dirs.push((path, name));
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Find the directory of the tree called `name`.
pub fn resolve_tree(db_dir: &Path, name: &str) -> DbResult<PathBuf> {
    tree_dirs(db_dir)?
        .into_iter()
        .find_map(|(path, tree_name)| (tree_name == name).then_some(path))
        .ok_or_else(|| DbError::TreeNotFound {
            name: name.to_string(),
            dir: db_dir.to_path_buf(),
        })
}

/// List all trees in the database directory, sorted by name.
pub fn list_trees(db_dir: &Path) -> DbResult<Vec<TreeInfo>> {
    let mut trees = Vec::new();
    for (path, name) in tree_dirs(db_dir)? {
        let created_at = TreeDatabase::open_at(&name, &path)
            .and_then(|db| {
                let value = db.get_metadata("created_at");
                db.close()?;
                value
            })
            .ok()
            .flatten()
            .and_then(|s| parse_timestamp(&s));
        let id = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        trees.push(TreeInfo {
            id,
            name,
            path,
            created_at,
        });
    }
    trees.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(trees)
}

/// Create a new, empty tree called `name`.
pub fn create_tree(db_dir: &Path, name: &str, researcher: Option<&Researcher>) -> DbResult<TreeInfo> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DbError::EmptyTreeName);
    }
    if tree_dirs(db_dir)?.iter().any(|(_, existing)| existing == name) {
        return Err(DbError::TreeExists(name.to_string()));
    }

    let id = Uuid::now_v7().simple().to_string();
    let path = db_dir.join(&id);
    fs::create_dir_all(&path).map_err(|e| DbError::io(&path, e))?;
    fs::write(path.join(NAME_FILE), name).map_err(|e| DbError::io(&path, e))?;
    fs::write(path.join(BACKEND_FILE), BACKEND).map_err(|e| DbError::io(&path, e))?;

    let created_at = Utc::now();
    let db = TreeDatabase::create_at(name, &path)?;
    db.set_metadata("created_at", &created_at.to_rfc3339())?;
    if let Some(r) = researcher {
        db.set_researcher(r)?;
    }
    db.close()?;

    tracing::info!(tree = name, path = %path.display(), "Created family tree");
    Ok(TreeInfo {
        id,
        name: name.to_string(),
        path,
        created_at: Some(created_at),
    })
}
