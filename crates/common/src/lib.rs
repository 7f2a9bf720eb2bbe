//! Notes Common Library
//!
//! Shared types, the message log and client configuration for the Notes
//! workspace.

pub mod config;
pub mod error;
pub mod messages;
pub mod types;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use messages::MessageLog;
pub use types::*;

/// Notes version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default base URL of the notes collection
pub const DEFAULT_NOTES_URL: &str = "http://localhost:8080/notes";

/// Default configuration directory
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".notes")
}

/// Default client configuration path
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join("config.toml")
}

/// Home directory helper
mod dirs {
    pub fn home_dir() -> Option<std::path::PathBuf> {
        std::env::var_os("HOME").map(std::path::PathBuf::from)
    }
}
