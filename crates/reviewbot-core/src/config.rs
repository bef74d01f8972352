//! ReviewBot configuration system.
//!
//! Secrets come from the process environment; everything else lives in an
//! optional TOML file with defaults for every key.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ReviewBotError};

pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";
/// Overrides the config file location.
pub const CONFIG_PATH_VAR: &str = "REVIEWBOT_CONFIG";

/// Older variable names, read when the primary one is unset.
const LEGACY_VARS: [(&str, &str); 3] = [
    (PRACTICUM_TOKEN_VAR, "YA_TOKEN"),
    (TELEGRAM_TOKEN_VAR, "TG_TOKEN"),
    (TELEGRAM_CHAT_ID_VAR, "CHAT_ID"),
];

/// Load `KEY=value` pairs from a `.env` file into the process environment.
/// Uses `path` when given, else searches the working directory and its
/// parents. Variables already set are not overridden. Returns the file that
/// was loaded, if any.
pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(path) => dotenvy::from_path(path).ok().map(|()| path.to_path_buf()),
        None => dotenvy::dotenv().ok(),
    }
}

/// Root configuration (non-secret tuning).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewBotConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_retry_period")]
    pub retry_period_secs: u64,
    #[serde(default = "default_telegram_api_base")]
    pub telegram_api_base: String,
    /// Append-only log file. Stdout only when unset.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_endpoint() -> String { "https://practicum.yandex.ru/api/user_api/homework_statuses/".into() }
fn default_retry_period() -> u64 { 600 }
fn default_telegram_api_base() -> String { "https://api.telegram.org".into() }
fn default_log_level() -> String { "info".into() }

impl Default for ReviewBotConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            retry_period_secs: default_retry_period(),
            telegram_api_base: default_telegram_api_base(),
            log_file: None,
            log_level: default_log_level(),
        }
    }
}

impl ReviewBotConfig {
    /// Load config from `$REVIEWBOT_CONFIG` or the default path.
    /// A missing file yields defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_path);
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ReviewBotError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| ReviewBotError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Get the default config path (~/.reviewbot/config.toml).
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".reviewbot")
            .join("config.toml")
    }

    pub fn retry_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.retry_period_secs)
    }
}

/// Access tokens and the destination chat, read once at startup.
#[derive(Clone)]
pub struct Secrets {
    pub practicum_token: String,
    pub telegram_token: String,
    pub chat_id: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("practicum_token", &"***")
            .field("telegram_token", &"***")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl Secrets {
    /// Read secrets from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read secrets through an arbitrary lookup. Empty values count as missing.
    /// Each secret falls back to its legacy name (`YA_TOKEN`, `TG_TOKEN`,
    /// `CHAT_ID`); errors name the primary variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &'static str| {
            read(name)
                .or_else(|| {
                    LEGACY_VARS
                        .iter()
                        .find(|(primary, _)| *primary == name)
                        .and_then(|(_, legacy)| read(*legacy))
                })
                .ok_or(ReviewBotError::Token(name))
        };
        Ok(Self {
            practicum_token: require(PRACTICUM_TOKEN_VAR)?,
            telegram_token: require(TELEGRAM_TOKEN_VAR)?,
            chat_id: require(TELEGRAM_CHAT_ID_VAR)?,
        })
    }
}
