//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Result, DEFAULT_NOTES_URL};

/// Configuration for talking to a notes backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// URL of the notes collection, e.g. `http://localhost:8080/notes`
    pub base_url: String,

    /// Request timeout. `None` leaves the transport default in place.
    pub timeout_secs: Option<u64>,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NOTES_URL.to_string(),
            timeout_secs: None,
            user_agent: format!("notes-client/{}", crate::VERSION),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Load configuration from file, or defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `NOTES_BASE_URL` and `NOTES_TIMEOUT_SECS` from the environment
    pub fn with_env(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup("NOTES_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(secs) = lookup("NOTES_TIMEOUT_SECS").filter(|v| !v.trim().is_empty()) {
            let secs = secs.trim().parse::<u64>().map_err(|_| {
                Error::InvalidConfig(format!("NOTES_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            self.timeout_secs = Some(secs);
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::InvalidConfig("base_url must not be empty".to_string()));
        }
        if self.timeout_secs == Some(0) {
            return Err(Error::InvalidConfig("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, "http://localhost:8080/notes");
        assert_eq!(config.timeout_secs, None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = ClientConfig {
            timeout_secs: Some(5),
            ..ClientConfig::with_base_url("http://127.0.0.1:9000/notes")
        };
        config.save(&path).unwrap();

        assert_eq!(ClientConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout_secs = 3\n").unwrap();

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.base_url, DEFAULT_NOTES_URL);
        assert_eq!(config.timeout_secs, Some(3));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("NOTES_BASE_URL", " http://notes.internal/notes "),
            ("NOTES_TIMEOUT_SECS", "10"),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::default()
            .with_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.base_url, "http://notes.internal/notes");
        assert_eq!(config.timeout_secs, Some(10));
    }

    #[test]
    fn test_bad_timeout_override() {
        let result = ClientConfig::default().with_overrides(|key| {
            (key == "NOTES_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = \"\"\n").unwrap();

        assert!(matches!(ClientConfig::load(&path), Err(Error::InvalidConfig(_))));
    }
}
