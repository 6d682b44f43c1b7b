//! Application configuration.
//!
//! Read once at startup from `<config_dir>/editor-launcher/config.toml`.
//! Every field has a default, so a missing or partial file is valid.

use crate::launch::terminal::TerminalEmulator;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const APP_DIR_NAME: &str = "editor-launcher";
const CONFIG_FILE_NAME: &str = "config.toml";
const RECENT_FILES_NAME: &str = "recent_files.json";
const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub const DEFAULT_CHAT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub editors: EditorsConfig,
    pub terminals: Vec<TerminalEmulator>,
    pub chat: ChatConfig,
    pub recent_files: RecentFilesConfig,
    pub start_directory: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            editors: EditorsConfig::default(),
            terminals: TerminalEmulator::default_preferences(),
            chat: ChatConfig::default(),
            recent_files: RecentFilesConfig::default(),
            start_directory: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorsConfig {
    /// Editor ids probed at startup, in display order.
    pub candidates: Vec<String>,
    /// Ids that need an interactive terminal.
    pub terminal_editors: Vec<String>,
}

impl Default for EditorsConfig {
    fn default() -> Self {
        Self {
            candidates: ["nano", "vim", "nvim", "gedit", "notepad", "code"]
                .iter()
                .map(|id| id.to_string())
                .collect(),
            terminal_editors: ["nano", "vim", "nvim"]
                .iter()
                .map(|id| id.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl ChatConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// The environment variable wins over the file so keys stay out of
    /// checked-in configs.
    pub fn resolve_api_key(&self, from_env: Option<String>) -> Option<String> {
        from_env
            .or_else(|| self.api_key.clone())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    pub fn api_key(&self) -> Option<String> {
        self.resolve_api_key(std::env::var(API_KEY_ENV).ok())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentFilesConfig {
    pub path: Option<PathBuf>,
}

impl RecentFilesConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| data_dir().join(RECENT_FILES_NAME))
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

impl AppConfig {
    pub fn parse(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(&raw, path).map(Some)
    }

    pub fn load() -> Self {
        let path = config_dir().join(CONFIG_FILE_NAME);
        match Self::load_from(&path) {
            Ok(Some(config)) => {
                tracing::info!("loaded config from {}", path.display());
                config
            }
            Ok(None) => {
                tracing::debug!("no config at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                tracing::warn!("{err}; using defaults");
                Self::default()
            }
        }
    }

    pub fn start_directory(&self) -> PathBuf {
        self.start_directory
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
