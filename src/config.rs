//! Runtime configuration.
//!
//! Values resolve in order: built-in defaults, the TOML config file,
//! environment overrides, then command line flags (applied by the binary).

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EmojidexError, EmojidexResult};

/// Overrides the data directory
pub const DATA_DIR_ENV: &str = "EMOJIDEX_DATA_DIR";

/// View shown when the interactive UI starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartView {
    #[default]
    Landing,
    Home,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            max_tokens: 1024,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Terminal event polling interval in milliseconds
    pub tick_rate_ms: u64,
    pub start_view: StartView,
    pub ai: AiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            tick_rate_ms: 50,
            start_view: StartView::default(),
            ai: AiConfig::default(),
        }
    }
}

impl Config {
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("emojidex")
    }

    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("emojidex").join("config.toml"))
    }

    /// Parses a config file body. `path` is only used for error reporting.
    pub fn from_toml(path: &Path, text: &str) -> EmojidexResult<Self> {
        toml::from_str(text).map_err(|e| {
            let span = e.span().unwrap_or(0..0);
            EmojidexError::config(path, text, span, e.message()).into()
        })
    }

    /// Loads `explicit` if given, else the default config file if it exists,
    /// else defaults. Environment overrides are applied afterwards.
    pub fn load(explicit: Option<&Path>) -> EmojidexResult<Self> {
        let config = match explicit {
            Some(path) => Self::read(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.is_file() => Self::read(&path)?,
                _ => Self::default(),
            },
        };

        Ok(config.with_env(|name| std::env::var(name).ok()))
    }

    fn read(path: &Path) -> EmojidexResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| EmojidexError::config(path, "", (0, 0), e.to_string()))?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml(path, &text)
    }

    /// Applies environment overrides looked up through `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|dir| !dir.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }

    /// The API key, if its environment variable is set and non-empty
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.ai.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("emojidex.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let text = r#"
            tick_rate_ms = 100
            start_view = "home"

            [ai]
            model = "claude-3-5-haiku-latest"
        "#;
        let config = Config::from_toml(Path::new("config.toml"), text).unwrap();

        assert_eq!(config.tick_rate(), Duration::from_millis(100));
        assert_eq!(config.start_view, StartView::Home);
        assert_eq!(config.ai.model, "claude-3-5-haiku-latest");
        assert_eq!(config.ai.max_tokens, 1024);
        assert_eq!(config.data_dir, Config::default_data_dir());
    }

    #[test]
    fn test_invalid_file_is_a_config_error() {
        let err = Config::from_toml(Path::new("config.toml"), "tick_rate_ms = \"fast\"").unwrap_err();
        assert!(err.to_string().starts_with("Config error in config.toml"));

        let err = Config::from_toml(Path::new("config.toml"), "start_view = \"sideways\"").unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("emojidex.toml");
        std::fs::write(&path, "data_dir = \"/tmp/emoji-data\"\n").unwrap();

        let config = Config::read(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/emoji-data"));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_env_override() {
        let config = Config::default().with_env(|name| {
            (name == DATA_DIR_ENV).then(|| "/srv/emojidex".to_string())
        });
        assert_eq!(config.data_dir, PathBuf::from("/srv/emojidex"));

        let untouched = Config::default().with_env(|_| Some("  ".to_string()));
        assert_eq!(untouched.data_dir, Config::default_data_dir());
    }

    #[test]
    fn test_log_path_lives_in_data_dir() {
        let config = Config {
            data_dir: PathBuf::from("/data"),
            ..Config::default()
        };
        assert_eq!(config.log_path(), PathBuf::from("/data/emojidex.log"));
    }
}
