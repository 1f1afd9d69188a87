//! CLI command execution.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::{default_database_dir, AppConfig};
use crate::db::{create_tree, list_trees};
use crate::models::Researcher;
use crate::server;

use super::args::{Cli, Commands};

/// Execute the parsed CLI command.
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            open,
        } => {
            let config = match config {
                Some(path) => AppConfig::load(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => AppConfig::from_env().context("Failed to load config")?,
            };
            server::serve(config, &host, port, open).await
        }
        Commands::CreateTree {
            name,
            researcher,
            email,
            database_path,
        } => cmd_create_tree(&name, researcher, email, database_path),
        Commands::ListTrees { database_path } => cmd_list_trees(database_path),
    }
}

fn database_dir(database_path: Option<PathBuf>) -> Result<PathBuf> {
    match database_path {
        Some(path) => Ok(path),
        None => Ok(default_database_dir()?),
    }
}

fn cmd_create_tree(
    name: &str,
    researcher: Option<String>,
    email: Option<String>,
    database_path: Option<PathBuf>,
) -> Result<()> {
    let db_dir = database_dir(database_path)?;
    let researcher = researcher.map(|r| Researcher {
        email: email.unwrap_or_default(),
        ..Researcher::named(r)
    });

    let tree = create_tree(&db_dir, name, researcher.as_ref())
        .with_context(|| format!("Failed to create tree '{name}'"))?;
    println!("Created tree '{}' ({})", tree.name, tree.id);
    println!("  {}", tree.path.display());
    Ok(())
}

fn cmd_list_trees(database_path: Option<PathBuf>) -> Result<()> {
    let db_dir = database_dir(database_path)?;
    let trees = list_trees(&db_dir)
        .with_context(|| format!("Failed to list trees in {}", db_dir.display()))?;

    if trees.is_empty() {
        println!("No trees found in {}", db_dir.display());
        return Ok(());
    }

    for tree in trees {
        let created = tree
            .created_at
            .map_or_else(|| "-".to_string(), |dt| dt.format("%Y-%m-%d %H:%M").to_string());
        println!("{:<30} {}  {}", tree.name, tree.id, created);
    }
    Ok(())
}
