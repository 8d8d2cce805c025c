use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::aggregator::StatusScope;
use crate::classifier::NumericRule;
use crate::error::{HangarError, Result};
use crate::session::Dashboard;
use crate::table::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_dir_string")]
    pub data_dir: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub numeric_rule: NumericRule,
    #[serde(default)]
    pub status_scope: StatusScope,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_data_dir_string() -> String {
    default_data_dir().to_string_lossy().to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir_string(),
            page_size: default_page_size(),
            numeric_rule: NumericRule::default(),
            status_scope: StatusScope::default(),
        }
    }
}

impl Settings {
    /// An empty dashboard configured from these settings.
    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(self.page_size, self.numeric_rule, self.status_scope)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("hangar")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("hangar")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(&path).unwrap_or_default();
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid settings, using defaults");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| HangarError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
