// RKSOK — Gateway Configuration
//
// Built-in defaults, optionally overlaid by a JSON file; the CLI applies its
// flags (and their RKSOK_* environment variables) on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:7777";
pub const DEFAULT_AUTHORITY: &str = "vragi-vezde.to.digital:51624";
pub const DEFAULT_FRAME_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_AUTHORITY_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid address {0:?}: expected host:port")]
    InvalidAddress(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Which phonebook backend to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// SQLite database file.
    #[default]
    Sql,
    /// One text file per record.
    Files,
    /// Process memory; nothing survives a restart.
    Memory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Database file or phonebook directory; platform data dir when unset.
    pub path: Option<PathBuf>,
    /// Serve fetches only.
    pub read_only: bool,
}

impl StorageConfig {
    /// The path the backend uses, falling back to the platform data dir.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        match self.backend {
            StorageBackend::Sql => data_dir().join("rksok.db"),
            StorageBackend::Files | StorageBackend::Memory => data_dir().join("phonebook"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Address the gateway listens on.
    pub listen: String,
    /// Regulatory authority endpoint.
    pub authority: String,
    pub frame_timeout_secs: u64,
    pub authority_timeout_secs: u64,
    pub storage: StorageConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            authority: DEFAULT_AUTHORITY.to_string(),
            frame_timeout_secs: DEFAULT_FRAME_TIMEOUT_SECS,
            authority_timeout_secs: DEFAULT_AUTHORITY_TIMEOUT_SECS,
            storage: StorageConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_address(&self.listen)?;
        validate_address(&self.authority)?;
        if self.frame_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("frame_timeout_secs"));
        }
        if self.authority_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("authority_timeout_secs"));
        }
        Ok(())
    }

    pub fn frame_timeout(&self) -> Duration {
        Duration::from_secs(self.frame_timeout_secs)
    }

    pub fn authority_timeout(&self) -> Duration {
        Duration::from_secs(self.authority_timeout_secs)
    }
}

/// Default directory for RKSOK data files.
pub fn data_dir() -> PathBuf {
    let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("rksok")
}

fn validate_address(addr: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidAddress(addr.to_string());
    let (host, port) = addr.rsplit_once(':').ok_or_else(invalid)?;
    if host.is_empty() || port.parse::<u16>().is_err() {
        return Err(invalid());
    }
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen, "127.0.0.1:7777");
        assert_eq!(config.frame_timeout(), Duration::from_secs(10));
        assert_eq!(config.storage.backend, StorageBackend::Sql);
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rksok.json");
        std::fs::write(
            &path,
            r#"{"authority":"127.0.0.1:9000","storage":{"backend":"files","path":"/tmp/pb"}}"#,
        )
        .unwrap();

        let config = GatewayConfig::load(&path).unwrap();
        assert_eq!(config.authority, "127.0.0.1:9000");
        assert_eq!(config.listen, DEFAULT_LISTEN);
        assert_eq!(config.storage.backend, StorageBackend::Files);
        assert_eq!(config.storage.resolved_path(), PathBuf::from("/tmp/pb"));
        assert!(!config.storage.read_only);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rksok.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(GatewayConfig::load(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = GatewayConfig::load(Path::new("/nonexistent/rksok.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_validate_addresses() {
        let mut config = GatewayConfig::default();
        config.listen = "localhost".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidAddress(_))));

        config.listen = ":7777".to_string();
        assert!(config.validate().is_err());

        config.listen = "0.0.0.0:99999".to_string();
        assert!(config.validate().is_err());

        config.listen = "[::1]:7777".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let config = GatewayConfig {
            frame_timeout_secs: 0,
            ..GatewayConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout(_))));
    }

    #[test]
    fn test_default_storage_paths() {
        let sql = StorageConfig::default();
        assert!(sql.resolved_path().ends_with("rksok/rksok.db"));

        let files = StorageConfig {
            backend: StorageBackend::Files,
            ..StorageConfig::default()
        };
        assert!(files.resolved_path().ends_with("rksok/phonebook"));
    }
}
