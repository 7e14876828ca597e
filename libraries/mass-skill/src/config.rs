//! Skill configuration.
use crate::error::{Result, SkillError};
use mass_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file, read from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "skill.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SkillConfig {
    #[serde(default = "default_music_assistant_url")]
    pub music_assistant_url: String,

    /// Long-lived Music Assistant API token
    #[serde(default)]
    pub api_token: Option<String>,

    /// Player name or id used when none is spoken
    #[serde(default)]
    pub default_player: Option<String>,

    #[serde(default = "default_volume_step")]
    pub volume_step: u8,

    #[serde(default = "default_search_limit")]
    pub search_limit: u32,

    /// Keep playing similar music after an artist runs out
    #[serde(default)]
    pub radio_mode: bool,

    #[serde(default = "default_lang")]
    pub lang: String,

    /// Extra locale resources overriding the built-in ones
    #[serde(default)]
    pub locale_dir: Option<PathBuf>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            music_assistant_url: default_music_assistant_url(),
            api_token: None,
            default_player: None,
            volume_step: default_volume_step(),
            search_limit: default_search_limit(),
            radio_mode: false,
            lang: default_lang(),
            locale_dir: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl SkillConfig {
    /// Load configuration from file and environment.
    ///
    /// An explicit `path` must exist; otherwise `skill.toml` is used when
    /// present. `MASS_`-prefixed variables override file values
    /// (`MASS_MUSIC_ASSISTANT_URL`, `MASS_DEFAULT_PLAYER`, ...).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(SkillError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(config::Environment::with_prefix("MASS").try_parsing(true));

        let config = settings
            .build()
            .map_err(|e| SkillError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| SkillError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.music_assistant_url.trim();
        if url.is_empty() {
            return Err(SkillError::Config(
                "music_assistant_url is required (set MASS_MUSIC_ASSISTANT_URL)".to_string(),
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(SkillError::Config(format!(
                "music_assistant_url must start with http:// or https://, got {}",
                url
            )));
        }

        if self.volume_step == 0 || self.volume_step > 100 {
            return Err(SkillError::Config(format!(
                "volume_step must be between 1 and 100, got {}",
                self.volume_step
            )));
        }

        if self.search_limit == 0 {
            return Err(SkillError::Config(
                "search_limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Client settings derived from this configuration.
    pub fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig::new(self.music_assistant_url.trim())
            .with_timeout(Duration::from_secs(self.request_timeout_secs));
        if let Some(token) = self.api_token.as_deref().filter(|t| !t.is_empty()) {
            client = client.with_token(token);
        }
        client
    }
}

// Default values
fn default_music_assistant_url() -> String {
    "http://localhost:8095".to_string()
}

fn default_volume_step() -> u8 {
    10
}

fn default_search_limit() -> u32 {
    5
}

fn default_lang() -> String {
    "en-us".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SkillConfig::default();
        assert_eq!(config.music_assistant_url, "http://localhost:8095");
        assert_eq!(config.volume_step, 10);
        assert_eq!(config.search_limit, 5);
        assert_eq!(config.lang, "en-us");
        assert!(config.default_player.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skill.toml");
        std::fs::write(
            &path,
            r#"
music_assistant_url = "http://mass.lan:8095/"
default_player = "Office Speaker"
volume_step = 15
radio_mode = true
"#,
        )
        .unwrap();

        let config = SkillConfig::load(Some(&path)).unwrap();
        assert_eq!(config.music_assistant_url, "http://mass.lan:8095/");
        assert_eq!(config.default_player.as_deref(), Some("Office Speaker"));
        assert_eq!(config.volume_step, 15);
        assert!(config.radio_mode);
        assert_eq!(config.search_limit, 5);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = SkillConfig::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(SkillError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SkillConfig {
            music_assistant_url: "mass.lan:8095".into(),
            ..SkillConfig::default()
        };
        assert!(config.validate().is_err());

        config.music_assistant_url = "http://mass.lan:8095".into();
        config.volume_step = 0;
        assert!(config.validate().is_err());

        config.volume_step = 101;
        assert!(config.validate().is_err());

        config.volume_step = 5;
        config.search_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_client_config() {
        let config = SkillConfig {
            api_token: Some("abc".into()),
            request_timeout_secs: 5,
            ..SkillConfig::default()
        };
        let client = config.client_config();
        assert_eq!(client.url, "http://localhost:8095");
        assert_eq!(client.token.as_deref(), Some("abc"));
        assert_eq!(client.timeout, Duration::from_secs(5));

        let no_token = SkillConfig {
            api_token: Some(String::new()),
            ..SkillConfig::default()
        };
        assert!(no_token.client_config().token.is_none());
    }
}
