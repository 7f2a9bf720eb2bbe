//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub listen: String,

    /// SQLite database file. `None` keeps notes in memory.
    pub db_path: Option<PathBuf>,

    /// Insert the seed notes into an empty store
    pub seed: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
            db_path: None,
            seed: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `NOTES_SERVER_LISTEN`, `NOTES_SERVER_DB` and `NOTES_SERVER_SEED`
    pub fn with_env(self) -> anyhow::Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        if let Some(listen) = lookup("NOTES_SERVER_LISTEN").filter(|v| !v.trim().is_empty()) {
            self.listen = listen.trim().to_string();
        }
        match lookup("NOTES_SERVER_DB").as_deref().map(str::trim) {
            None | Some("") => {}
            Some(":memory:") => self.db_path = None,
            Some(path) => self.db_path = Some(PathBuf::from(path)),
        }
        if let Some(seed) = lookup("NOTES_SERVER_SEED") {
            self.seed = match seed.trim() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => anyhow::bail!("NOTES_SERVER_SEED must be a boolean, got {other:?}"),
            };
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::load(Path::new("/nonexistent/notes-server.toml")).unwrap();
        assert_eq!(config.listen, "127.0.0.1:8080");
        assert!(config.db_path.is_none());
        assert!(config.seed);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(&path, "listen = \"0.0.0.0:9000\"\ndb_path = \"/var/lib/notes.db\"\n").unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.listen, "0.0.0.0:9000");
        assert_eq!(config.db_path, Some(PathBuf::from("/var/lib/notes.db")));
        assert!(config.seed);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig {
            db_path: Some(PathBuf::from("notes.db")),
            ..Default::default()
        }
        .with_overrides(|key| match key {
            "NOTES_SERVER_LISTEN" => Some("127.0.0.1:0".to_string()),
            "NOTES_SERVER_DB" => Some(":memory:".to_string()),
            "NOTES_SERVER_SEED" => Some("0".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.listen, "127.0.0.1:0");
        assert!(config.db_path.is_none());
        assert!(!config.seed);
    }

    #[test]
    fn test_bad_seed_flag() {
        let result = ServerConfig::default()
            .with_overrides(|key| (key == "NOTES_SERVER_SEED").then(|| "maybe".to_string()));
        assert!(result.is_err());
    }
}
