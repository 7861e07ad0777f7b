//! Configuration loading and config file resolution
//!
//! Bootstrap configuration lives in a single TOML file. Every field has a
//! built-in default so a missing file never prevents startup.
//!
//! # Config file priority
//!
//! 1. Command-line argument (`--config`)
//! 2. Environment variable (`SONGNOTE_CONFIG`)
//! 3. `./songnote.toml` in the current directory
//! 4. `<config_dir>/songnote/songnote.toml` (platform config directory)
//!
//! Telegram secrets may additionally be supplied through environment
//! variables, which take precedence over the TOML values.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "SONGNOTE_CONFIG";
/// Environment override for the bot token
pub const BOT_TOKEN_ENV: &str = "SONGNOTE_BOT_TOKEN";
/// Environment override for the main chat id
pub const CHAT_ID_ENV: &str = "SONGNOTE_CHAT_ID";
/// Environment override for the test chat id
pub const CHAT_ID_TEST_ENV: &str = "SONGNOTE_CHAT_ID_TEST";

const CONFIG_FILE_NAME: &str = "songnote.toml";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Telegram Bot API credentials and target chats
    pub telegram: TelegramConfig,
    /// Metadata resolution settings
    pub resolver: ResolverConfig,
    /// External media tools and working directory
    pub media: MediaConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Telegram settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub chat_id_test: String,
}

impl TelegramConfig {
    /// Select the target chat, failing when the requested chat is not configured
    pub fn chat_id_for(&self, use_test_channel: bool) -> Result<&str> {
        let (chat_id, key) = if use_test_channel {
            (&self.chat_id_test, "chat_id_test")
        } else {
            (&self.chat_id, "chat_id")
        };

        if chat_id.trim().is_empty() {
            return Err(Error::Config(format!(
                "telegram.{} is not set (config file or environment)",
                key
            )));
        }
        Ok(chat_id.as_str())
    }
}

/// Metadata resolver settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// oEmbed endpoint queried first
    pub oembed_endpoint: String,
    /// Per-request HTTP timeout in seconds
    pub request_timeout_secs: u64,
    /// Deadline covering both resolution stages (0 disables it)
    pub overall_deadline_secs: u64,
    /// User-Agent sent with every resolver request
    pub user_agent: String,
    /// Whether the structured-block page heuristic runs at all
    pub page_heuristic: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            oembed_endpoint: "https://song.link/oembed".to_string(),
            request_timeout_secs: 30,
            overall_deadline_secs: 0,
            user_agent: format!("songnote/{}", env!("CARGO_PKG_VERSION")),
            page_heuristic: true,
        }
    }
}

/// External media tool settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MediaConfig {
    pub ytdlp_path: PathBuf,
    pub ffmpeg_path: PathBuf,
    /// Working directory for downloads and processed output
    pub work_dir: PathBuf,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: PathBuf::from("yt-dlp"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            work_dir: PathBuf::from("temp"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Parsed from this file
    File(PathBuf),
    /// A file was named but does not exist; defaults were used
    Missing(PathBuf),
    /// No file found anywhere; defaults were used
    Defaults,
}

/// Resolve which config file to read, following the priority order above.
///
/// Explicit paths (CLI or environment) are returned even when the file does
/// not exist so the caller can report them.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("songnote").join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}

/// Load configuration from an optional path and apply environment overrides.
///
/// A missing file falls back to defaults; a malformed file is an error.
pub fn load_config(path: Option<&Path>) -> Result<(TomlConfig, ConfigOrigin)> {
    let (mut config, origin) = match path {
        None => (TomlConfig::default(), ConfigOrigin::Defaults),
        Some(path) if !path.exists() => {
            (TomlConfig::default(), ConfigOrigin::Missing(path.to_path_buf()))
        }
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            let config: TomlConfig = toml::from_str(&content)?;
            (config, ConfigOrigin::File(path.to_path_buf()))
        }
    };

    config.apply_env_overrides();
    config.validate()?;
    Ok((config, origin))
}

impl TomlConfig {
    /// Override Telegram secrets from the environment when set
    pub fn apply_env_overrides(&mut self) {
        let overrides = [
            (BOT_TOKEN_ENV, &mut self.telegram.bot_token),
            (CHAT_ID_ENV, &mut self.telegram.chat_id),
            (CHAT_ID_TEST_ENV, &mut self.telegram.chat_id_test),
        ];

        for (var, field) in overrides {
            if let Ok(value) = std::env::var(var) {
                if !value.trim().is_empty() {
                    *field = value.trim().to_string();
                }
            }
        }
    }

    /// Reject values that cannot work at all
    pub fn validate(&self) -> Result<()> {
        if self.resolver.oembed_endpoint.trim().is_empty() {
            return Err(Error::Config(
                "resolver.oembed_endpoint must not be empty".to_string(),
            ));
        }
        if self.resolver.request_timeout_secs == 0 {
            return Err(Error::Config(
                "resolver.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
