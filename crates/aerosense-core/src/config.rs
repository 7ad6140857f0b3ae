//! Configuration management for AeroSense.
//!
//! Loads configuration from ${AEROSENSE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::chat::{ChatClientConfig, DEFAULT_GREETING};

/// Environment variable holding the chat bearer key.
pub const API_KEY_ENV: &str = "AEROSENSE_API_KEY";
/// Environment variable overriding the backend base URL.
pub const BASE_URL_ENV: &str = "AEROSENSE_BASE_URL";
/// Environment variable overriding the log filter.
pub const LOG_ENV: &str = "AEROSENSE_LOG";

/// Chat backend settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Values given on the command line; they win over config and env.
#[derive(Debug, Clone, Default)]
pub struct ChatOverrides {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub greeting: String,
    pub log_level: String,
    pub chat: ChatConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            log_level: Self::DEFAULT_LOG_LEVEL.to_string(),
            chat: ChatConfig::default(),
        }
    }
}

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for AeroSense configuration.
    //!
    //! AEROSENSE_HOME resolution order:
    //! 1. AEROSENSE_HOME environment variable (if set)
    //! 2. ~/.config/aerosense (default)

    use std::path::PathBuf;

    /// Returns the AeroSense home directory.
    pub fn aerosense_home() -> PathBuf {
        if let Ok(home) = std::env::var("AEROSENSE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".aerosense"),
            |h| h.join(".config").join("aerosense"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        aerosense_home().join("config.toml")
    }
}

impl Config {
    pub const DEFAULT_LOG_LEVEL: &'static str = "warn";

    /// Loads configuration from the default path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Greeting to open a session with, if any.
    pub fn greeting(&self) -> Option<&str> {
        let trimmed = self.greeting.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Builds the chat client configuration.
    ///
    /// Base URL: override > `AEROSENSE_BASE_URL` > config.
    /// API key: override > config > `AEROSENSE_API_KEY`.
    ///
    /// # Errors
    /// Returns an error if no base URL or API key is available, or the URL is invalid.
    pub fn chat_client_config(&self, overrides: &ChatOverrides) -> Result<ChatClientConfig> {
        let base_url = match non_blank(overrides.base_url.as_deref()) {
            Some(url) => validate_url(url)?,
            None => resolve_base_url(self.chat.base_url.as_deref(), BASE_URL_ENV)?,
        };
        let api_key = match non_blank(overrides.api_key.as_deref()) {
            Some(key) => key.to_string(),
            None => resolve_api_key(self.chat.api_key.as_deref(), API_KEY_ENV)?,
        };
        Ok(ChatClientConfig::new(base_url, api_key))
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

/// Resolves an API key with precedence: config > env.
///
/// # Errors
/// Returns an error if neither source provides a key.
pub fn resolve_api_key(config_api_key: Option<&str>, env_var: &str) -> Result<String> {
    if let Some(key) = non_blank(config_api_key) {
        return Ok(key.to_string());
    }

    let from_env = std::env::var(env_var).ok();
    non_blank(from_env.as_deref())
        .map(str::to_string)
        .with_context(|| format!("No API key available. Set {env_var} or api_key in [chat]."))
}

/// Resolves the backend base URL with precedence: env > config.
///
/// # Errors
/// Returns an error if neither source provides a URL, or it is malformed.
pub fn resolve_base_url(config_base_url: Option<&str>, env_var: &str) -> Result<String> {
    let from_env = std::env::var(env_var).ok();
    if let Some(url) = non_blank(from_env.as_deref()) {
        return validate_url(url);
    }

    if let Some(url) = non_blank(config_base_url) {
        return validate_url(url);
    }

    anyhow::bail!("No chat base URL configured. Set {env_var} or base_url in [chat].")
}

/// Validates that a URL is well-formed and strips trailing slashes.
fn validate_url(url: &str) -> Result<String> {
    url::Url::parse(url).with_context(|| format!("Invalid chat base URL: {url}"))?;
    Ok(url.trim_end_matches('/').to_string())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNSET_ENV: &str = "AEROSENSE_TEST_SURELY_UNSET_VAR";

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.greeting(), Some(DEFAULT_GREETING));
        assert_eq!(config.log_level, "warn");
        assert!(config.chat.base_url.is_none());
    }

    #[test]
    fn test_default_template_parses_to_defaults() {
        let config: Config = toml::from_str(default_config_template()).unwrap();
        assert_eq!(config.greeting, DEFAULT_GREETING);
        assert_eq!(config.log_level, Config::DEFAULT_LOG_LEVEL);
        assert!(config.chat.api_key.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "greeting = \"\"\n[chat]\nbase_url = \"http://localhost:54321\"\n")
            .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.greeting(), None);
        assert_eq!(config.log_level, "warn");
        assert_eq!(
            config.chat.base_url.as_deref(),
            Some("http://localhost:54321")
        );
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "greeting = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::init(&path).unwrap();
        assert!(path.exists());
        assert!(Config::init(&path).is_err());
    }

    #[test]
    fn test_resolve_api_key_prefers_config() {
        assert_eq!(
            resolve_api_key(Some("  from-config "), UNSET_ENV).unwrap(),
            "from-config"
        );
        assert!(resolve_api_key(Some("   "), UNSET_ENV).is_err());
        assert!(resolve_api_key(None, UNSET_ENV).is_err());
    }

    #[test]
    fn test_resolve_base_url_validates_and_trims() {
        assert_eq!(
            resolve_base_url(Some("https://abc.supabase.co/"), UNSET_ENV).unwrap(),
            "https://abc.supabase.co"
        );
        assert!(resolve_base_url(Some("not a url"), UNSET_ENV).is_err());
        assert!(resolve_base_url(None, UNSET_ENV).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let mut config = Config::default();
        config.chat.base_url = Some("https://config.example".to_string());
        config.chat.api_key = Some("config-key".to_string());

        let overrides = ChatOverrides {
            base_url: Some("http://127.0.0.1:9000/".to_string()),
            api_key: Some("cli-key".to_string()),
        };
        let client = config.chat_client_config(&overrides).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:9000");
        assert_eq!(client.api_key, "cli-key");
    }
}
