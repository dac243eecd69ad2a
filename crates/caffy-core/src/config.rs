use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::types::SafetyLevel;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DUMMY_STREAM_DELAY_MS: u64 = 100;
pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 7;
pub const DEFAULT_CHUNK_SIZE: u32 = 50;

/// Top-level config (caffy.toml + CAFFY_* env overrides).
///
/// Env keys nest on a double underscore: `CAFFY_BACKEND__BASE_URL`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaffyConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// Which data source the client talks to.
///
/// `Dummy` serves canned fixtures and never touches the network. It replaces
/// the old "developer login" switch with a value chosen once at startup.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BackendMode {
    #[default]
    Live,
    Dummy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub mode: BackendMode,
    /// Bearer token issued by the identity provider. Obtaining it is out of
    /// scope; set it here or via CAFFY_BACKEND__TOKEN.
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Pause between canned stream chunks in dummy mode.
    #[serde(default = "default_dummy_stream_delay_ms")]
    pub dummy_stream_delay_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            mode: BackendMode::default(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            dummy_stream_delay_ms: DEFAULT_DUMMY_STREAM_DELAY_MS,
        }
    }
}

/// Query flags and body defaults sent with every chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub safety_level: SafetyLevel,
    #[serde(default = "bool_true")]
    pub use_memory: bool,
    #[serde(default = "bool_true")]
    pub use_filter: bool,
    #[serde(default = "bool_true")]
    pub use_level_chain: bool,
    #[serde(default = "bool_true")]
    pub is_mem0_api: bool,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            safety_level: SafetyLevel::default(),
            use_memory: true,
            use_filter: true,
            use_level_chain: true,
            is_mem0_api: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// How many days ahead of today the upcoming-events window reaches.
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_dummy_stream_delay_ms() -> u64 {
    DEFAULT_DUMMY_STREAM_DELAY_MS
}
fn default_chunk_size() -> u32 {
    DEFAULT_CHUNK_SIZE
}
fn default_lookahead_days() -> u32 {
    DEFAULT_LOOKAHEAD_DAYS
}

impl CaffyConfig {
    /// Load config from a TOML file with CAFFY_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.caffy/caffy.toml
    ///
    /// A missing file is not an error; every field has a default.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);
        tracing::debug!(path = %path, "loading config");

        Self::figment(&path)
            .extract()
            .map_err(|e| crate::error::CaffyError::Config(e.to_string()))
    }

    fn figment(path: &str) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("CAFFY_").split("__"))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.caffy/caffy.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let config = CaffyConfig::default();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.backend.mode, BackendMode::Live);
        assert!(config.backend.token.is_none());
        assert_eq!(config.chat.safety_level, SafetyLevel::Moderate);
        assert_eq!(config.chat.chunk_size, 50);
        assert_eq!(config.calendar.lookahead_days, 7);
    }

    #[test]
    fn toml_overrides_are_merged_over_defaults() {
        let toml = r#"
            [backend]
            base_url = "https://caffy.example.com"
            mode = "dummy"

            [chat]
            safety_level = "strict"
        "#;

        let config: CaffyConfig = Figment::new()
            .merge(Toml::string(toml))
            .extract()
            .expect("valid config");

        assert_eq!(config.backend.base_url, "https://caffy.example.com");
        assert_eq!(config.backend.mode, BackendMode::Dummy);
        assert_eq!(config.backend.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.chat.safety_level, SafetyLevel::Strict);
        assert!(config.chat.use_memory);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let toml = r#"
            [backend]
            mode = "replit"
        "#;

        let result: std::result::Result<CaffyConfig, _> =
            Figment::new().merge(Toml::string(toml)).extract();
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = CaffyConfig::load(Some("/nonexistent/caffy-test/caffy.toml"))
            .expect("missing file falls back to defaults");
        assert_eq!(config.calendar.lookahead_days, DEFAULT_LOOKAHEAD_DAYS);
    }
}
