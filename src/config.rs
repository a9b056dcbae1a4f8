use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::Deserialize;

use crate::error::ConfigError;

// =============================================================================
// Time-related constants
// =============================================================================

/// Default minimum time between two prompts for the same update (3 days)
pub const DEFAULT_THROTTLE_INTERVAL_MS: i64 = 3 * 24 * 60 * 60 * 1000;

/// Timeout for HTTP feed fetches in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: i64 = 30_000;

/// Upgrade alert configuration
///
/// Fixed for the lifetime of a session once the engine is built.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AlertConfig {
    /// Minimum time between prompts in milliseconds
    pub throttle_interval: i64,
    /// Prompt on every check, even when no update is available
    pub debug_always_show: bool,
    /// Prompt once if no alert has ever been shown
    pub debug_show_once: bool,
    pub show_ignore: bool,
    pub show_later: bool,
    pub show_release_notes: bool,
    /// Overrides the minimum supported version published by the feed
    pub min_app_version: Option<String>,
    pub app_id: Option<String>,
    pub locale: Option<String>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            throttle_interval: DEFAULT_THROTTLE_INTERVAL_MS,
            debug_always_show: false,
            debug_show_once: false,
            show_ignore: true,
            show_later: true,
            show_release_notes: true,
            min_app_version: None,
            app_id: None,
            locale: None,
        }
    }
}

impl AlertConfig {
    /// Load configuration from a JSON file; missing fields use defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Negative intervals are treated as zero
    pub fn throttle_duration(&self) -> Duration {
        Duration::milliseconds(self.throttle_interval.max(0))
    }
}

/// Returns the path to the data directory for upgrade-alert.
/// Uses $XDG_DATA_HOME/upgrade-alert if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/upgrade-alert,
/// or ./upgrade-alert if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the alert state database.
pub fn db_path() -> PathBuf {
    data_dir().join("alert-state.db")
}

/// Returns the path to the default configuration file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Returns the directory log files are written to.
pub fn log_dir() -> PathBuf {
    data_dir().join("logs")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("upgrade-alert")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn alert_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<AlertConfig>(json!({
            "throttleInterval": 1000,
            "showLater": false
        }))
        .unwrap();

        assert_eq!(
            result,
            AlertConfig {
                throttle_interval: 1000,
                show_later: false,
                ..AlertConfig::default()
            }
        );
    }

    #[test]
    fn alert_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<AlertConfig>(json!({
            "throttleInterval": 5000,
            "debugAlwaysShow": true,
            "debugShowOnce": true,
            "showIgnore": false,
            "showLater": false,
            "showReleaseNotes": false,
            "minAppVersion": "2.0.0",
            "appId": "com.example.app",
            "locale": "ja-JP"
        }))
        .unwrap();

        assert_eq!(
            result,
            AlertConfig {
                throttle_interval: 5000,
                debug_always_show: true,
                debug_show_once: true,
                show_ignore: false,
                show_later: false,
                show_release_notes: false,
                min_app_version: Some("2.0.0".to_string()),
                app_id: Some("com.example.app".to_string()),
                locale: Some("ja-JP".to_string()),
            }
        );
    }

    #[test]
    fn default_throttle_is_three_days() {
        assert_eq!(AlertConfig::default().throttle_duration(), Duration::days(3));
    }

    #[test]
    fn negative_throttle_interval_is_clamped_to_zero() {
        let config = AlertConfig {
            throttle_interval: -10,
            ..AlertConfig::default()
        };

        assert_eq!(config.throttle_duration(), Duration::zero());
    }

    #[test]
    fn from_file_reads_json_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"debugShowOnce": true}"#).unwrap();

        let config = AlertConfig::from_file(&path).unwrap();

        assert!(config.debug_show_once);
        assert_eq!(config.throttle_interval, DEFAULT_THROTTLE_INTERVAL_MS);
    }

    #[test]
    fn from_file_reports_malformed_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            AlertConfig::from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/upgrade-alert"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home_local_share() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(path, PathBuf::from("/home/user/.local/share/upgrade-alert"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = data_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./upgrade-alert"));
    }
}
