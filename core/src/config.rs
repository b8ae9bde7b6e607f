//! Configuration system for Endermite
//!
//! The bot reads a single JSON document describing the guild it serves, the
//! channels it works in and the reaction-role bindings. The role message id
//! is written back after the first run creates it.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Discord credentials
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiscordConfig {
    /// Bot token from Discord Developer Portal
    #[serde(default)]
    pub token: String,
    /// Application ID (Bot Application ID)
    #[serde(default)]
    pub application_id: u64,
}

/// Paste service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasteConfig {
    /// Base URL of the paste service
    #[serde(default = "default_paste_base_url")]
    pub base_url: String,
    /// Lifetime of created pastes in seconds
    #[serde(default = "default_paste_expiration")]
    pub expiration_secs: u64,
    /// Largest attachment accepted for pasting
    #[serde(default = "default_paste_max_size")]
    pub max_size_bytes: u64,
}

impl Default for PasteConfig {
    fn default() -> Self {
        Self {
            base_url: default_paste_base_url(),
            expiration_secs: default_paste_expiration(),
            max_size_bytes: default_paste_max_size(),
        }
    }
}

fn default_paste_base_url() -> String {
    "https://paste.moddingx.org".to_string()
}

fn default_paste_expiration() -> u64 {
    7 * 24 * 60 * 60
}

fn default_paste_max_size() -> u64 {
    6 * 1024 * 1024
}

/// GitHub API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// REST API base URL
    #[serde(default = "default_github_api_base")]
    pub api_base: String,
    /// Optional token, raises the anonymous rate limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: default_github_api_base(),
            token: None,
        }
    }
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

/// One emote/role binding on the role message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReactEmoteConfig {
    /// Custom guild emoji id
    pub emote: u64,
    /// Role granted while the reaction is present
    pub role: u64,
    /// Text shown next to the emoji in the role message embed
    #[serde(default)]
    pub description: String,
}

/// Root configuration for Endermite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Discord credentials
    #[serde(default)]
    pub discord: DiscordConfig,
    /// Guild the bot serves
    #[serde(default)]
    pub guild: u64,
    /// Channel holding the role message
    #[serde(default)]
    pub role_channel: u64,
    /// Role message, created on first run when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_message: Option<u64>,
    /// Channel where "Open Support Thread" may be used
    #[serde(default)]
    pub github_channel: u64,
    /// Forum channel receiving support threads
    #[serde(default)]
    pub support_forum: u64,
    /// Emote/role bindings, in display order
    #[serde(default)]
    pub emote_configs: Vec<ReactEmoteConfig>,
    /// Paste service
    #[serde(default)]
    pub paste: PasteConfig,
    /// GitHub API
    #[serde(default)]
    pub github: GithubConfig,
    /// How long a file selection prompt waits for a click
    #[serde(default = "default_selection_timeout")]
    pub selection_timeout_secs: u64,
}

fn default_selection_timeout() -> u64 {
    30
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            discord: DiscordConfig::default(),
            guild: 0,
            role_channel: 0,
            role_message: None,
            github_channel: 0,
            support_forum: 0,
            emote_configs: Vec::new(),
            paste: PasteConfig::default(),
            github: GithubConfig::default(),
            selection_timeout_secs: default_selection_timeout(),
        }
    }
}

impl BotConfig {
    /// Check that the bot can start with this configuration
    pub fn validate(&self) -> Result<()> {
        if self.discord.token.is_empty() {
            return Err(ConfigError::Missing("discord.token".to_string()).into());
        }
        if self.guild == 0 {
            return Err(ConfigError::Missing("guild".to_string()).into());
        }
        if self.selection_timeout_secs == 0 {
            return Err(
                ConfigError::Invalid("selection_timeout_secs must be positive".to_string()).into(),
            );
        }
        Ok(())
    }

    /// Timeout for interactive file selection
    pub fn selection_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.selection_timeout_secs)
    }
}

/// Get the default config directory
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".endermite")
}

/// Get the default config file path
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("botconfig.json")
}

/// Load configuration from file
pub async fn load_config(path: &Path) -> Result<BotConfig> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()).into());
    }

    let contents = fs::read_to_string(path).await?;

    let mut config: BotConfig = serde_json::from_str(&contents)
        .map_err(|e| ConfigError::Parse(format!("Failed to parse config JSON: {}", e)))?;

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Apply environment variable overrides to config
fn apply_env_overrides(config: &mut BotConfig) {
    if let Ok(token) = std::env::var("DISCORD_TOKEN")
        && !token.is_empty()
    {
        tracing::debug!("discord token from environment");
        config.discord.token = token;
    }

    if let Ok(id) = std::env::var("DISCORD_CLIENT_ID") {
        match id.parse() {
            Ok(id) => config.discord.application_id = id,
            Err(_) => tracing::warn!("ignoring malformed DISCORD_CLIENT_ID: {}", id),
        }
    }

    if let Ok(token) = std::env::var("GITHUB_TOKEN")
        && !token.is_empty()
    {
        config.github.token = Some(token);
    }
}

/// Save configuration to file
pub async fn save_config(path: &Path, config: &BotConfig) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;

    fs::write(path, json).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EndermiteError;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: BotConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.selection_timeout_secs, 30);
        assert_eq!(config.paste.max_size_bytes, 6 * 1024 * 1024);
        assert_eq!(config.paste.expiration_secs, 604_800);
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert!(config.role_message.is_none());
    }

    #[test]
    fn test_default_matches_empty_document() {
        let config = BotConfig::default();
        assert_eq!(config.selection_timeout_secs, 30);
        assert_eq!(config.paste.base_url, "https://paste.moddingx.org");
    }

    #[test]
    fn test_validate_requires_token() {
        let config = BotConfig {
            guild: 1,
            selection_timeout_secs: 30,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            EndermiteError::Config(ConfigError::Missing(ref key)) if key == "discord.token"
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config: BotConfig = serde_json::from_str(r#"{"guild": 1}"#).unwrap();
        config.discord.token = "token".to_string();
        config.selection_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("botconfig.json");

        let mut config: BotConfig = serde_json::from_str("{}").unwrap();
        config.guild = 10;
        config.role_message = Some(99);
        config.emote_configs.push(ReactEmoteConfig {
            emote: 1,
            role: 2,
            description: "Modder".to_string(),
        });

        save_config(&path, &config).await.unwrap();
        let loaded = load_config(&path).await.unwrap();

        assert_eq!(loaded.guild, 10);
        assert_eq!(loaded.role_message, Some(99));
        assert_eq!(loaded.emote_configs, config.emote_configs);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("absent.json")).await.unwrap_err();
        assert!(matches!(err, EndermiteError::Config(ConfigError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("botconfig.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();
        let err = load_config(&path).await.unwrap_err();
        assert!(matches!(err, EndermiteError::Config(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_paths() {
        let config_dir = get_config_dir();
        let config_path = get_config_path();
        assert!(config_path.starts_with(&config_dir));
    }
}
