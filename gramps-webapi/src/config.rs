//! Application configuration, loaded once at startup from a TOML file.
//!
//! The file path comes from the `GRAMPS_API_CONFIG` environment variable
//! (or `--config`). Keys use the upper-case names of the upstream project:
//!
//! ```toml
//! TREE = "smith_family"
//! CORS_ORIGINS = ["https://family.example.org"]
//! DATABASE_PATH = "/srv/gramps/grampsdb"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const ENV_CONFIG_FILE: &str = "GRAMPS_API_CONFIG";

/// Path prefix of all REST API routes.
pub const API_PREFIX: &str = "/api";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable GRAMPS_API_CONFIG is not set")]
    MissingEnv,

    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config key TREE must not be empty")]
    EmptyTree,

    #[error("Invalid CORS origin '{0}'")]
    InvalidOrigin(String),

    #[error("Could not determine home directory for the default DATABASE_PATH")]
    NoHomeDir,
}

/// Allowed cross-origin hosts, either a single value or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CorsOrigins {
    One(String),
    Many(Vec<String>),
}

impl CorsOrigins {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(origin) => vec![origin.clone()],
            Self::Many(origins) => origins.clone(),
        }
    }
}

/// Process-wide configuration. Immutable after loading.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    /// Name of the family tree to serve.
    pub tree: String,
    #[serde(default)]
    pub cors_origins: Option<CorsOrigins>,
    /// Directory holding the trees.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load the file named by [`ENV_CONFIG_FILE`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var_os(ENV_CONFIG_FILE).ok_or(ConfigError::MissingEnv)?;
        Self::load(Path::new(&path))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        content.parse()
    }

    /// Allowed origins, or `None` when CORS is not configured.
    ///
    /// An empty list counts as not configured.
    pub fn cors_origins(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .cors_origins
            .as_ref()?
            .to_vec()
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        (!origins.is_empty()).then_some(origins)
    }

    /// Directory holding the trees, falling back to the default location.
    pub fn database_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => default_database_dir(),
        }
    }
}

impl std::str::FromStr for AppConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Self = toml::from_str(s)?;
        if config.tree.trim().is_empty() {
            return Err(ConfigError::EmptyTree);
        }
        Ok(config)
    }
}

/// Default tree directory: `$GRAMPSHOME/.gramps/grampsdb`, else `~/.gramps/grampsdb`.
pub fn default_database_dir() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("GRAMPSHOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".gramps").join("grampsdb"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: AppConfig = r#"TREE = "smith_family""#.parse().unwrap();
        assert_eq!(config.tree, "smith_family");
        assert!(config.cors_origins().is_none());
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_missing_tree_is_an_error() {
        let err = "CORS_ORIGINS = \"*\"".parse::<AppConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = "TREE = \"  \"".parse::<AppConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyTree));
    }

    #[test]
    fn test_cors_origins_string_or_list() {
        let one: AppConfig = "TREE = \"t\"\nCORS_ORIGINS = \"https://a.example\""
            .parse()
            .unwrap();
        assert_eq!(one.cors_origins(), Some(vec!["https://a.example".to_string()]));

        let many: AppConfig = "TREE = \"t\"\nCORS_ORIGINS = [\"https://a.example\", \"https://b.example\"]"
            .parse()
            .unwrap();
        assert_eq!(many.cors_origins().map(|o| o.len()), Some(2));

        let empty: AppConfig = "TREE = \"t\"\nCORS_ORIGINS = []".parse().unwrap();
        assert!(empty.cors_origins().is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "TREE = \"jones\"\nDATABASE_PATH = \"/srv/trees\"\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.tree, "jones");
        assert_eq!(config.database_dir().unwrap(), PathBuf::from("/srv/trees"));

        let missing = AppConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }
}
