//! Configuration resolution for regbot.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Optional JSON settings file (`--config <path>`)
//! 3. Environment variables
//! 4. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default public base URL of the Telegram Bot API.
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Complete regbot configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// HTTP server and storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory holding one JSON file per registration.
    pub data_dir: PathBuf,
    /// Directory containing `index.html` and `soon.html`.
    pub site_root: PathBuf,
    /// Public assets directory, relative to `site_root` unless absolute.
    pub public_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            data_dir: PathBuf::from("data"),
            site_root: PathBuf::from("."),
            public_dir: PathBuf::from("public"),
        }
    }
}

impl ServerConfig {
    /// Resolved location of the public assets directory.
    pub fn public_path(&self) -> PathBuf {
        self.site_root.join(&self.public_dir)
    }
}

/// Messaging bot configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub admin_chat_id: String,
    pub api_base: String,
    /// Deadline for each outbound Bot API call (seconds).
    pub request_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            admin_chat_id: String::new(),
            api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl TelegramConfig {
    /// Both the bot token and the admin destination are set.
    pub const fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.admin_chat_id.is_empty()
    }
}

// Hand-written so the bot token never ends up in logs.
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &if self.bot_token.is_empty() { "" } else { "<redacted>" })
            .field("admin_chat_id", &self.admin_chat_id)
            .field("api_base", &self.api_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Load configuration with hierarchical resolution.
///
/// A settings file that is named explicitly but cannot be read or parsed is
/// an error. Missing bot credentials are not.
pub fn load_config(settings_file: Option<&Path>) -> Result<Config> {
    let mut config = match settings_file {
        Some(path) => load_config_file(path)?,
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("TG_BOT_TOKEN") {
        config.telegram.bot_token = val;
    }
    if let Some(val) = lookup("TG_ADMIN_CHAT_ID") {
        config.telegram.admin_chat_id = val;
    }
    if let Some(val) = lookup("TG_API_BASE") {
        config.telegram.api_base = val;
    }
    if let Some(val) = lookup("PORT") {
        if let Ok(n) = val.parse() {
            config.server.port = n;
        }
    }
    if let Some(val) = lookup("DATA_DIR") {
        config.server.data_dir = PathBuf::from(val);
    }
    if let Some(val) = lookup("SITE_ROOT") {
        config.server.site_root = PathBuf::from(val);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_deployment() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.data_dir, PathBuf::from("data"));
        assert_eq!(config.server.public_path(), PathBuf::from("./public"));
        assert_eq!(config.telegram.api_base, DEFAULT_TELEGRAM_API_BASE);
        assert_eq!(config.telegram.request_timeout_secs, 10);
        assert!(!config.telegram.is_configured());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("TG_BOT_TOKEN", "123:abc"),
                ("TG_ADMIN_CHAT_ID", "42"),
                ("PORT", "9090"),
                ("DATA_DIR", "/var/lib/regbot"),
            ]),
        );
        assert!(config.telegram.is_configured());
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.data_dir, PathBuf::from("/var/lib/regbot"));
    }

    #[test]
    fn bad_port_is_ignored() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, env(&[("PORT", "eighty")]));
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn token_alone_is_not_configured() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, env(&[("TG_BOT_TOKEN", "123:abc")]));
        assert!(!config.telegram.is_configured());
    }

    #[test]
    fn settings_file_partial_sections_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"server": {"port": 3000}}"#).unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.data_dir, PathBuf::from("data"));
        assert_eq!(config.telegram.api_base, DEFAULT_TELEGRAM_API_BASE);
    }

    #[test]
    fn missing_settings_file_is_config_error() {
        let err = load_config_file(Path::new("/nonexistent/regbot.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got: {err}");
    }

    #[test]
    fn debug_redacts_token() {
        let tg = TelegramConfig {
            bot_token: "123:secret".into(),
            ..TelegramConfig::default()
        };
        let shown = format!("{tg:?}");
        assert!(!shown.contains("secret"));
        assert!(shown.contains("<redacted>"));
    }
}
