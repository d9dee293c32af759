//! Configuration for the practice coach
//!
//! Settings come from three layers: built-in defaults, an optional TOML
//! file, and environment variables. Environment wins over file, file over
//! defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::Result;

/// Default analysis service URL
const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";

/// Default whole-request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default locale preference for synthesis voices (Flemish, then Dutch)
const DEFAULT_LOCALE_TAGS: &[&str] = &["nl-BE", "nl"];

/// Practice coach configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the analysis service
    pub service_url: String,

    /// Scenario label sent with every submission
    pub scenario: String,

    /// Ordered locale tags used to pick a synthesis voice
    pub locale_tags: Vec<String>,

    /// Whether to play the response phrase after feedback
    pub playback_enabled: bool,

    /// Whole-request timeout for analysis submissions
    pub request_timeout: Duration,
}

/// Optional file overlay (`parlo.toml` in the user config directory)
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    service_url: Option<String>,
    scenario: Option<String>,
    locale_tags: Option<Vec<String>>,
    playback: Option<bool>,
    timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from defaults, the config file, and environment
    ///
    /// # Errors
    ///
    /// Returns error if the config file exists but cannot be parsed
    pub fn load() -> Result<Self> {
        let file = Self::load_file()?;

        let service_url = std::env::var("PARLO_SERVICE_URL")
            .ok()
            .or(file.service_url)
            .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string());

        let scenario = std::env::var("PARLO_SCENARIO")
            .ok()
            .or(file.scenario)
            .unwrap_or_else(|| crate::session::DEFAULT_SCENARIO.to_string());

        let locale_tags = std::env::var("PARLO_LOCALE_TAGS")
            .ok()
            .map(|tags| parse_locale_tags(&tags))
            .or(file.locale_tags)
            .unwrap_or_else(|| DEFAULT_LOCALE_TAGS.iter().map(ToString::to_string).collect());

        let playback_enabled = std::env::var("PARLO_DISABLE_PLAYBACK")
            .map(|v| !(v == "1" || v.eq_ignore_ascii_case("true")))
            .ok()
            .or(file.playback)
            .unwrap_or(true);

        let timeout_secs = std::env::var("PARLO_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            service_url,
            scenario,
            locale_tags,
            playback_enabled,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Parse the config file when present
    fn load_file() -> Result<FileConfig> {
        let Some(path) = Self::config_path() else {
            return Ok(FileConfig::default());
        };

        if !path.exists() {
            return Ok(FileConfig::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let file: FileConfig = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(file)
    }

    /// Path to `parlo.toml` in the user config directory
    fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "parlo", "parlo")
            .map(|dirs| dirs.config_dir().join("parlo.toml"))
    }
}

/// Split a comma-separated tag list, dropping empty entries
fn parse_locale_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale_tags() {
        assert_eq!(parse_locale_tags("nl-BE,nl"), vec!["nl-BE", "nl"]);
        assert_eq!(parse_locale_tags(" fr-FR , fr ,"), vec!["fr-FR", "fr"]);
        assert!(parse_locale_tags("").is_empty());
    }

    #[test]
    fn test_file_config_parses() {
        let file: FileConfig = toml::from_str(
            r#"
            service_url = "http://coach.example:9000"
            scenario = "Cafe"
            locale_tags = ["de-AT", "de"]
            playback = false
            timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(file.service_url.as_deref(), Some("http://coach.example:9000"));
        assert_eq!(file.scenario.as_deref(), Some("Cafe"));
        assert_eq!(file.playback, Some(false));
        assert_eq!(file.timeout_secs, Some(30));
    }

    #[test]
    fn test_partial_file_config() {
        let file: FileConfig = toml::from_str(r#"scenario = "Doctor""#).unwrap();
        assert_eq!(file.scenario.as_deref(), Some("Doctor"));
        assert!(file.service_url.is_none());
        assert!(file.locale_tags.is_none());
    }
}
