//! Service configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service_name: String,
    pub bind_addr: String,
    pub port: u16,
    pub storage: StorageKind,
    pub mongodb: MongoConfig,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "groupsplit".to_string(),
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            storage: StorageKind::Mongo,
            mongodb: MongoConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Memory,
    Mongo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "GroupSplit".to_string(),
        }
    }
}

impl Config {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// `GROUPSPLIT_CONFIG` names a TOML file; environment variables override it.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("GROUPSPLIT_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Config::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(uri) = std::env::var("MONGODB_URI") {
            self.mongodb.uri = uri;
        }
        if let Ok(database) = std::env::var("MONGODB_DATABASE") {
            self.mongodb.database = database;
        }
        if let Ok(addr) = std::env::var("GROUPSPLIT_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Ok(port) = std::env::var("GROUPSPLIT_PORT") {
            self.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid port: {}", port)))?;
        }
        if let Ok(storage) = std::env::var("GROUPSPLIT_STORAGE") {
            self.storage = match storage.as_str() {
                "memory" => StorageKind::Memory,
                "mongo" | "mongodb" => StorageKind::Mongo,
                other => return Err(Error::Config(format!("Unknown storage: {}", other))),
            };
        }
        if let Ok(filter) = std::env::var("RUST_LOG") {
            self.log_filter = filter;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            port = 9000
            storage = "memory"

            [mongodb]
            database = "Splits"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.mongodb.database, "Splits");
        assert_eq!(config.mongodb.uri, MongoConfig::default().uri);
        assert_eq!(config.bind_addr, "0.0.0.0");
    }

    // One test owns the environment so parallel tests never see half-set variables.
    #[test]
    fn test_env_overrides() {
        std::env::set_var("MONGODB_DATABASE", "SplitsEnv");
        std::env::set_var("GROUPSPLIT_PORT", "8181");
        std::env::set_var("GROUPSPLIT_STORAGE", "memory");
        let config = Config::from_env();

        std::env::set_var("GROUPSPLIT_PORT", "eighty");
        let bad_port = Config::from_env();

        std::env::set_var("GROUPSPLIT_PORT", "8181");
        std::env::set_var("GROUPSPLIT_STORAGE", "postgres");
        let bad_storage = Config::from_env();

        for name in ["MONGODB_DATABASE", "GROUPSPLIT_PORT", "GROUPSPLIT_STORAGE"] {
            std::env::remove_var(name);
        }

        let config = config.unwrap();
        assert_eq!(config.mongodb.database, "SplitsEnv");
        assert_eq!(config.port, 8181);
        assert_eq!(config.storage, StorageKind::Memory);
        assert!(matches!(bad_port, Err(Error::Config(msg)) if msg == "Invalid port: eighty"));
        assert!(matches!(
            bad_storage,
            Err(Error::Config(msg)) if msg == "Unknown storage: postgres"
        ));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(Config::from_toml("port = \"x\""), Err(Error::Config(_))));
    }
}
