//! Persisted tool configuration: named connection domains.
//!
//! The store lives at `~/.config/flowsync/config.toml` (XDG user config,
//! overridable with `FLOWSYNC_CONFIG_DIR`). It holds one or more named
//! "domains" — complete sets of API and database connection settings — plus
//! the name of the currently active one. Every command resolves its
//! connection settings from the active domain.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Application name for XDG directory resolution.
const APP_NAME: &str = "flowsync";

/// Config filename within the config directory.
const STORE_FILE: &str = "config.toml";

/// Environment variable to override the config directory.
///
/// Useful for testing and for running against multiple installations.
const CONFIG_DIR_ENV: &str = "FLOWSYNC_CONFIG_DIR";

/// Name of the built-in domain that always exists and cannot be removed.
pub const DEFAULT_DOMAIN: &str = "default";

/// Connection settings for one named domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Domain name (unique within the store).
    pub name: String,
    /// Base URL of the publish API.
    pub api_base_url: String,
    /// API version segment used in reinitialize calls.
    pub api_version: String,
    /// Database host.
    pub db_host: String,
    /// Database port.
    pub db_port: u16,
    /// Database name.
    pub db_name: String,
    /// Database user.
    pub db_user: String,
    /// Database password.
    pub db_password: String,
}

impl DomainConfig {
    /// Create a domain with default local-development settings.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_base_url: "http://localhost:4201".to_string(),
            api_version: "v1".to_string(),
            db_host: "localhost".to_string(),
            db_port: 5432,
            db_name: "workflow_db".to_string(),
            db_user: "postgres".to_string(),
            db_password: "postgres".to_string(),
        }
    }

    /// Postgres connection string for this domain.
    pub fn db_connection_string(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            self.db_host, self.db_port, self.db_name, self.db_user, self.db_password
        )
    }
}

/// The on-disk configuration store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigStore {
    /// Name of the active domain.
    pub active_domain: String,
    /// All known domains.
    pub domains: Vec<DomainConfig>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self {
            active_domain: DEFAULT_DOMAIN.to_string(),
            domains: vec![DomainConfig::with_name(DEFAULT_DOMAIN)],
        }
    }
}

impl ConfigStore {
    /// Load the store from the default location.
    ///
    /// A missing file yields the default store rather than an error, so the
    /// tool works out of the box.
    pub fn load() -> Result<Self> {
        match store_path() {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load the store from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save the store to the default location, creating directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = store_path().ok_or_else(|| {
            ConfigError::Reserved("could not resolve a config directory".to_string())
        })?;
        self.save_to(&path)
    }

    /// Save the store to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// The active domain's settings.
    pub fn active(&self) -> Result<&DomainConfig> {
        self.domains
            .iter()
            .find(|d| d.name == self.active_domain)
            .ok_or_else(|| ConfigError::DomainNotFound(self.active_domain.clone()))
    }

    /// Look up a domain by name.
    pub fn get(&self, name: &str) -> Option<&DomainConfig> {
        self.domains.iter().find(|d| d.name == name)
    }

    /// Add a new domain, inheriting unset values from the default domain.
    pub fn add_domain(&mut self, name: &str) -> Result<&DomainConfig> {
        if self.get(name).is_some() {
            return Err(ConfigError::DomainExists(name.to_string()));
        }
        let mut domain = self
            .get(DEFAULT_DOMAIN)
            .cloned()
            .unwrap_or_else(|| DomainConfig::with_name(DEFAULT_DOMAIN));
        domain.name = name.to_string();
        self.domains.push(domain);
        Ok(self.domains.last().expect("just pushed"))
    }

    /// Switch the active domain.
    pub fn use_domain(&mut self, name: &str) -> Result<()> {
        if self.get(name).is_none() {
            return Err(ConfigError::DomainNotFound(name.to_string()));
        }
        self.active_domain = name.to_string();
        Ok(())
    }

    /// Remove a domain. The default domain cannot be removed; removing the
    /// active domain falls back to the default.
    pub fn remove_domain(&mut self, name: &str) -> Result<()> {
        if name == DEFAULT_DOMAIN {
            return Err(ConfigError::Reserved(
                "cannot remove the default domain".to_string(),
            ));
        }
        let before = self.domains.len();
        self.domains.retain(|d| d.name != name);
        if self.domains.len() == before {
            return Err(ConfigError::DomainNotFound(name.to_string()));
        }
        if self.active_domain == name {
            self.active_domain = DEFAULT_DOMAIN.to_string();
        }
        Ok(())
    }

    /// Set a single key on the active domain.
    ///
    /// `name` is reserved: domains are renamed only through add/remove.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        if key == "name" || key == "active_domain" {
            return Err(ConfigError::Reserved(format!(
                "'{key}' cannot be set directly; use the domain subcommands"
            )));
        }
        let active = self.active_domain.clone();
        let domain = self
            .domains
            .iter_mut()
            .find(|d| d.name == active)
            .ok_or(ConfigError::DomainNotFound(active))?;

        match key {
            "api_base_url" => domain.api_base_url = value.to_string(),
            "api_version" => domain.api_version = value.to_string(),
            "db_host" => domain.db_host = value.to_string(),
            "db_port" => {
                domain.db_port = value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("'{value}' is not a valid port"),
                })?;
            }
            "db_name" => domain.db_name = value.to_string(),
            "db_user" => domain.db_user = value.to_string(),
            "db_password" => domain.db_password = value.to_string(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Reset the store to its default state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Path of the config store file, honoring the env override.
pub fn store_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(STORE_FILE))
}

/// The flowsync config directory.
///
/// Checks `FLOWSYNC_CONFIG_DIR` first, then the platform config dir.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_store_has_default_domain() {
        let store = ConfigStore::default();
        assert_eq!(store.active_domain, "default");
        assert_eq!(store.active().unwrap().db_port, 5432);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut store = ConfigStore::default();
        store.set_value("api_base_url", "http://engine:9000").unwrap();
        store.save_to(&path).unwrap();

        let loaded = ConfigStore::load_from(&path).unwrap();
        assert_eq!(loaded.active().unwrap().api_base_url, "http://engine:9000");
    }

    #[test]
    fn add_domain_inherits_from_default() {
        let mut store = ConfigStore::default();
        store.set_value("db_host", "shared-db").unwrap();
        store.add_domain("staging").unwrap();

        let staging = store.get("staging").unwrap();
        assert_eq!(staging.db_host, "shared-db");
        assert_eq!(staging.name, "staging");
    }

    #[test]
    fn add_duplicate_domain_fails() {
        let mut store = ConfigStore::default();
        store.add_domain("staging").unwrap();
        assert!(matches!(
            store.add_domain("staging"),
            Err(ConfigError::DomainExists(_))
        ));
    }

    #[test]
    fn use_unknown_domain_fails() {
        let mut store = ConfigStore::default();
        assert!(matches!(
            store.use_domain("nope"),
            Err(ConfigError::DomainNotFound(_))
        ));
    }

    #[test]
    fn remove_active_domain_falls_back_to_default() {
        let mut store = ConfigStore::default();
        store.add_domain("staging").unwrap();
        store.use_domain("staging").unwrap();
        store.remove_domain("staging").unwrap();
        assert_eq!(store.active_domain, "default");
    }

    #[test]
    fn cannot_remove_default_domain() {
        let mut store = ConfigStore::default();
        assert!(matches!(
            store.remove_domain("default"),
            Err(ConfigError::Reserved(_))
        ));
    }

    #[test]
    fn set_reserved_key_fails() {
        let mut store = ConfigStore::default();
        assert!(store.set_value("name", "other").is_err());
        assert!(store.set_value("active_domain", "other").is_err());
    }

    #[test]
    fn set_invalid_port_fails() {
        let mut store = ConfigStore::default();
        assert!(matches!(
            store.set_value("db_port", "not-a-port"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn connection_string_contains_all_parts() {
        let domain = DomainConfig::with_name("default");
        let cs = domain.db_connection_string();
        assert!(cs.contains("host=localhost"));
        assert!(cs.contains("port=5432"));
        assert!(cs.contains("dbname=workflow_db"));
    }
}
