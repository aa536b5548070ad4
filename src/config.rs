use crate::core::{LitedalError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure parsed from a TOML file.
///
/// Connection profiles are keyed by name; a session resolves its profile at
/// construction time.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub connections: HashMap<String, ConnectionProfile>,
}

/// A named connection profile.
#[derive(Debug, Deserialize, Clone)]
pub struct ConnectionProfile {
    /// Database file path, or ":memory:" for an in-memory database.
    pub path: String,
    /// Pragma statements applied once when the connection opens.
    pub pragmas: Option<Vec<String>>,
}

impl ConnectionProfile {
    pub fn new(path: impl Into<String>) -> Self {
        ConnectionProfile {
            path: path.into(),
            pragmas: None,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file at the given path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| LitedalError::Config(e.to_string()))
    }

    /// Loads configuration from the default location
    /// (`<config dir>/litedal/config.toml`).
    pub fn load_default() -> Result<Config> {
        let path = Config::default_path().ok_or_else(|| {
            LitedalError::Config("no configuration directory available".to_string())
        })?;
        Config::load(path)
    }

    /// Default configuration file location for the current platform.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("litedal").join("config.toml"))
    }

    /// Resolves a connection profile by name.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty key; `Config` when no profile is
    /// registered under the key.
    pub fn profile(&self, key: &str) -> Result<&ConnectionProfile> {
        if key.is_empty() {
            return Err(LitedalError::InvalidArgument(
                "connection profile key is empty".to_string(),
            ));
        }
        self.connections.get(key).ok_or_else(|| {
            LitedalError::Config(format!("no connection profile named '{}'", key))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
[connections.main]
path = "app.db"
pragmas = ["PRAGMA foreign_keys = ON;", "PRAGMA journal_mode = WAL;"]

[connections.scratch]
path = ":memory:"
"#;

    #[test]
    fn test_parse_profiles() {
        let config: Config = toml::from_str(SAMPLE_CONFIG).expect("Failed to parse sample config");
        assert_eq!(config.connections.len(), 2);

        let main = config.profile("main").unwrap();
        assert_eq!(main.path, "app.db");
        assert_eq!(main.pragmas.as_ref().unwrap().len(), 2);

        let scratch = config.profile("scratch").unwrap();
        assert_eq!(scratch.path, ":memory:");
        assert!(scratch.pragmas.is_none());
    }

    #[test]
    fn test_unknown_profile_is_a_config_error() {
        let config: Config = toml::from_str(SAMPLE_CONFIG).unwrap();
        match config.profile("missing") {
            Err(LitedalError::Config(msg)) => assert!(msg.contains("missing")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_key_is_invalid() {
        let config = Config::default();
        assert!(matches!(
            config.profile(""),
            Err(LitedalError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "connections = 42").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(LitedalError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        assert!(matches!(
            Config::load("/nonexistent/litedal-config.toml"),
            Err(LitedalError::Io(_))
        ));
    }
}
