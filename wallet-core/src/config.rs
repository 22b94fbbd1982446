//! Configuration management
//!
//! Settings live in `settings.json` inside the wallet data directory:
//! ```json
//! {
//!   "storage": { "backend": "duckdb", "databaseFile": "wallets.duckdb" },
//!   "risk": { "blockedOwners": [], "serviceUrl": null, "timeoutSecs": 5 }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::DEFAULT_RISK_TIMEOUT;

/// Settings file name inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Environment variable overriding the data directory
pub const ENV_WALLET_HOME: &str = "WALLET_HOME";
/// Environment variable overriding `storage.backend`
pub const ENV_STORAGE_BACKEND: &str = "WALLET_STORAGE_BACKEND";
/// Environment variable overriding `risk.serviceUrl`
pub const ENV_RISK_URL: &str = "WALLET_RISK_URL";

const DEFAULT_DATABASE_FILE: &str = "wallets.duckdb";

/// Where wallets are persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    DuckDb,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::DuckDb => "duckdb",
            StorageBackend::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "duckdb" => Ok(StorageBackend::DuckDb),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("unknown storage backend: {}", other),
        }
    }
}

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    storage: StorageSettings,
    #[serde(default)]
    risk: RiskSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageSettings {
    #[serde(default)]
    backend: StorageBackend,
    #[serde(default = "default_database_file")]
    database_file: String,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_file: default_database_file(),
            other: HashMap::new(),
        }
    }
}

fn default_database_file() -> String {
    DEFAULT_DATABASE_FILE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RiskSettings {
    #[serde(default)]
    blocked_owners: Vec<String>,
    #[serde(default)]
    service_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            blocked_owners: Vec::new(),
            service_url: None,
            timeout_secs: default_timeout_secs(),
            other: HashMap::new(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_RISK_TIMEOUT.as_secs()
}

/// Wallet configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub storage_backend: StorageBackend,
    /// Database file name, relative to the data directory
    pub database_file: String,
    pub blocked_owners: Vec<String>,
    pub risk_service_url: Option<String>,
    pub risk_timeout: Duration,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_settings(SettingsFile::default())
    }
}

impl Config {
    fn from_settings(raw: SettingsFile) -> Self {
        Self {
            storage_backend: raw.storage.backend,
            database_file: raw.storage.database_file.clone(),
            blocked_owners: raw.risk.blocked_owners.clone(),
            risk_service_url: raw.risk.service_url.clone(),
            risk_timeout: Duration::from_secs(raw.risk.timeout_secs),
            _raw_settings: raw,
        }
    }

    /// Load config from the data directory, applying environment overrides
    ///
    /// A missing or unparsable settings file yields the defaults.
    pub fn load(data_dir: &Path) -> Result<Self> {
        Self::load_with_env(data_dir, |key| std::env::var(key).ok())
    }

    /// Load config using `env` to look up overrides
    pub fn load_with_env(data_dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let settings_path = data_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let mut config = Self::from_settings(raw);

        if let Some(backend) = env(ENV_STORAGE_BACKEND) {
            config.storage_backend = backend
                .parse()
                .with_context(|| format!("Invalid {}", ENV_STORAGE_BACKEND))?;
        }
        if let Some(url) = env(ENV_RISK_URL).filter(|u| !u.trim().is_empty()) {
            config.risk_service_url = Some(url);
        }

        Ok(config)
    }

    /// Save config to the data directory
    /// Preserves settings this crate doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join(SETTINGS_FILE);

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        settings.storage.backend = self.storage_backend;
        settings.storage.database_file = self.database_file.clone();
        settings.risk.blocked_owners = self.blocked_owners.clone();
        settings.risk.service_url = self.risk_service_url.clone();
        settings.risk.timeout_secs = self.risk_timeout.as_secs();

        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Add an owner to the local blocklist
    pub fn block_owner(&mut self, email: &str) {
        let email = email.trim().to_string();
        if !self.blocked_owners.iter().any(|o| o.eq_ignore_ascii_case(&email)) {
            self.blocked_owners.push(email);
        }
    }

    /// Remove an owner from the local blocklist
    pub fn unblock_owner(&mut self, email: &str) {
        let email = email.trim();
        self.blocked_owners.retain(|o| !o.eq_ignore_ascii_case(email));
    }
}

/// Get the data directory from `WALLET_HOME` or default to `~/.wallet-core`
pub fn default_data_dir() -> Result<PathBuf> {
    resolve_data_dir(std::env::var(ENV_WALLET_HOME).ok(), dirs::home_dir())
}

fn resolve_data_dir(env_dir: Option<String>, home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = env_dir.filter(|d| !d.trim().is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    home.map(|h| h.join(".wallet-core"))
        .context("Could not find home directory")
}
