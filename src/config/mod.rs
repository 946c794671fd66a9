use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::core::models::CryptoConfig;
use crate::error::{Result, VaultSealError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub vault_path: PathBuf,
    pub log_level: String,
    /// Defaults for newly written vaults. Existing vaults carry their own.
    pub crypto: CryptoConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            vault_path: default_vault_path(),
            log_level: "info".to_string(),
            crypto: CryptoConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let path = config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = AppConfig::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&config_file_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: AppConfig = toml::from_str(&content)?;
            config.crypto.validate()?;
            Ok(config)
        } else {
            Err(VaultSealError::Config(format!(
                "Config file not found: {}",
                path.display()
            )))
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.crypto.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

fn config_file_path() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("", "", "vaultseal") {
        dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from("vaultseal.toml")
    }
}

fn default_vault_path() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("", "", "vaultseal") {
        dirs.data_dir().join("vault.json")
    } else {
        PathBuf::from("vault.json")
    }
}
