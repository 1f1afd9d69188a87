//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// REST API for a Gramps family tree
#[derive(Parser, Debug)]
#[command(name = "gramps-webapi")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the configured tree over HTTP
    Serve {
        /// Configuration file (TOML); defaults to the file named by GRAMPS_API_CONFIG
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Open browser automatically
        #[arg(long)]
        open: bool,
    },

    /// Create a new, empty family tree
    CreateTree {
        /// Name of the tree
        name: String,

        /// Name of the researcher owning the tree
        #[arg(long)]
        researcher: Option<String>,

        /// Researcher e-mail address
        #[arg(long, requires = "researcher")]
        email: Option<String>,

        /// Directory holding the trees (default: ~/.gramps/grampsdb)
        #[arg(long)]
        database_path: Option<PathBuf>,
    },

    /// List the family trees in the database directory
    ListTrees {
        /// Directory holding the trees (default: ~/.gramps/grampsdb)
        #[arg(long)]
        database_path: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from([
            "gramps-webapi",
            "serve",
            "--config",
            "/etc/gramps.toml",
            "--port",
            "8080",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve { config, port, host, .. } => {
                assert_eq!(config, Some(PathBuf::from("/etc/gramps.toml")));
                assert_eq!(port, 8080);
                assert_eq!(host, "127.0.0.1");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_email_requires_researcher() {
        let result = Cli::try_parse_from([
            "gramps-webapi",
            "create-tree",
            "smith_family",
            "--email",
            "jane@example.org",
        ]);
        assert!(result.is_err());
    }
}
