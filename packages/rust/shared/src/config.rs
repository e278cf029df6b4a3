//! Application configuration for FileBot.
//!
//! User config lives at `~/.filebot/filebot.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FileBotError, Result};
use crate::types::Session;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "filebot.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".filebot";

// ---------------------------------------------------------------------------
// Config structs (matching filebot.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// File store endpoints.
    #[serde(default)]
    pub service: ServiceConfig,

    /// File explorer behaviour.
    #[serde(default)]
    pub explorer: ExplorerConfig,

    /// Answer proxy endpoint.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Who the user is.
    #[serde(default)]
    pub session: SessionConfig,
}

/// `[service]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL the `nodes/`, `search/`, `download/` and `file/` endpoints hang off.
    #[serde(default = "default_service_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_service_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_service_url() -> String {
    "http://127.0.0.1:8000/api".into()
}
fn default_timeout_secs() -> u64 {
    5
}

/// How selecting a file is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileMode {
    /// Hand back a download link; never fetch the bytes.
    #[default]
    Download,
    /// Fetch and classify the file for inline preview.
    Preview,
}

/// `[explorer]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Whether search snippets get emphasis markers around query keywords.
    #[serde(default = "default_true")]
    pub highlight: bool,

    #[serde(default)]
    pub file_mode: FileMode,

    /// Marker inserted before each highlighted span.
    #[serde(default = "default_emphasis_open")]
    pub emphasis_open: String,

    /// Marker inserted after each highlighted span.
    #[serde(default = "default_emphasis_close")]
    pub emphasis_close: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            highlight: true,
            file_mode: FileMode::default(),
            emphasis_open: default_emphasis_open(),
            emphasis_close: default_emphasis_close(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_emphasis_open() -> String {
    "<mark>".into()
}
fn default_emphasis_close() -> String {
    "</mark>".into()
}

/// `[chat]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Backend root serving `bot/chat/` and `bot/signup/{id}/`.
    #[serde(default = "default_chat_url")]
    pub base_url: String,

    /// Reply generation is slow; this bounds one chat round trip in seconds.
    #[serde(default = "default_chat_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_chat_url(),
            timeout_secs: default_chat_timeout_secs(),
        }
    }
}

fn default_chat_url() -> String {
    "http://127.0.0.1:8000".into()
}
fn default_chat_timeout_secs() -> u64 {
    60
}

/// `[session]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Remote user id. Empty means unknown.
    #[serde(default)]
    pub user_id: String,

    /// Name of the env var holding the access token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            token_env: default_token_env(),
        }
    }
}

fn default_token_env() -> String {
    "FILEBOT_ACCESS_TOKEN".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.filebot/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| FileBotError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.filebot/filebot.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| FileBotError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        FileBotError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| FileBotError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| FileBotError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| FileBotError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject configs whose endpoints cannot be parsed as URLs.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    for (key, value) in [
        ("service.base_url", &config.service.base_url),
        ("chat.base_url", &config.chat.base_url),
    ] {
        url::Url::parse(value)
            .map_err(|e| FileBotError::config(format!("{key} '{value}' is not a URL: {e}")))?;
    }
    if config.service.timeout_secs == 0 || config.chat.timeout_secs == 0 {
        return Err(FileBotError::config("timeout_secs must be at least 1"));
    }
    Ok(())
}

/// Build the session from config: user id from the file, token from the env var.
pub fn load_session(config: &AppConfig) -> Session {
    let user_id = Some(config.session.user_id.trim().to_string()).filter(|id| !id.is_empty());
    let token = std::env::var(&config.session.token_env)
        .ok()
        .filter(|t| !t.is_empty());

    if token.is_none() {
        tracing::debug!(env = %config.session.token_env, "no access token in environment");
    }

    Session { user_id, token }
}

/// Check that the session carries a credential and a user id.
pub fn require_credential(config: &AppConfig, session: &Session) -> Result<()> {
    if session.bearer().is_none() {
        let var_name = &config.session.token_env;
        return Err(FileBotError::config(format!(
            "access token not found. Sign in and set the {var_name} environment variable."
        )));
    }
    if session.user_id.is_none() {
        return Err(FileBotError::config(
            "user id not set. Pass --user or set session.user_id in filebot.toml.",
        ));
    }
    Ok(())
}
