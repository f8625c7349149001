//! Application configuration.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use retrocast_forecast_model::{builtin_locations, LocationConfig};

use crate::error::{RetrocastError, RetrocastResult};

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";

/// Environment variable overriding the output directory.
pub const OUTPUT_DIR_ENV: &str = "RETROCAST_OUTPUT_DIR";

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory the videos are written to.
    pub output_dir: PathBuf,

    /// Weather provider settings.
    pub provider: ProviderConfig,

    /// Video format settings.
    pub video: VideoSettings,

    /// TrueType font used for all text. Discovered from system paths when unset.
    pub font_path: Option<PathBuf>,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Locations rendered on each run, in order.
    pub locations: Vec<LocationConfig>,
}

/// Weather provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the provider's data API.
    pub base_url: String,

    /// Per-request timeout.
    pub request_timeout_secs: u64,

    /// Extra attempts after a transport failure or 5xx response.
    pub retries: u32,

    /// Pause between attempts.
    pub retry_backoff_ms: u64,

    /// API key. Normally supplied through the environment, never logged.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

/// Video format settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,

    /// Length of the forecast-card segment.
    pub card_segment_secs: u32,

    /// Length of the animated-map segment.
    pub map_segment_secs: u32,

    /// How long each map still is held.
    pub map_frame_secs: u32,

    /// x264 preset.
    pub preset: String,

    /// x264 constant rate factor.
    pub crf: u8,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "retrocast=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            provider: ProviderConfig::default(),
            video: VideoSettings::default(),
            font_path: None,
            logging: LoggingConfig::default(),
            locations: builtin_locations(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            request_timeout_secs: 10,
            retries: 1,
            retry_backoff_ms: 500,
            api_key: None,
        }
    }
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
            card_segment_secs: 10,
            map_segment_secs: 10,
            map_frame_secs: 1,
            preset: "medium".to_string(),
            crf: 23,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl VideoSettings {
    /// Total video length.
    pub fn duration_secs(&self) -> u32 {
        self.card_segment_secs + self.map_segment_secs
    }

    /// Number of distinct stills in the map segment.
    pub fn map_frame_count(&self) -> u32 {
        self.map_segment_secs / self.map_frame_secs.max(1)
    }
}

impl AppConfig {
    /// Load config from the standard location. Only a missing file falls
    /// back to defaults; an unreadable or malformed one is a config error.
    pub fn load() -> RetrocastResult<Self> {
        Self::load_or_default(&config_file_path())
    }

    /// Defaults when `path` does not exist, otherwise [`AppConfig::load_from`].
    pub fn load_or_default(path: &Path) -> RetrocastResult<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from an explicit path. Errors are not swallowed.
    pub fn load_from(path: &Path) -> RetrocastResult<Self> {
        if !path.exists() {
            return Err(RetrocastError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            RetrocastError::config(format!("invalid config {}: {e}", path.display()))
        })
    }

    /// Apply environment overrides (API key, output directory).
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(OUTPUT_DIR_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, api_key: Option<String>, output_dir: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.provider.api_key = Some(key.trim().to_string());
        }
        if let Some(dir) = output_dir.filter(|d| !d.trim().is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
    }

    /// The API key, or a configuration error naming the variable to set.
    pub fn require_api_key(&self) -> RetrocastResult<&str> {
        self.provider
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| RetrocastError::config(format!("{API_KEY_ENV} is not set")))
    }

    /// Reject settings the pipeline cannot work with.
    pub fn validate(&self) -> RetrocastResult<()> {
        let video = &self.video;
        if video.width == 0 || video.height == 0 {
            return Err(RetrocastError::config("video resolution must be non-zero"));
        }
        if video.width % 2 != 0 || video.height % 2 != 0 {
            return Err(RetrocastError::config(
                "yuv420p requires an even video width and height",
            ));
        }
        if video.fps == 0 {
            return Err(RetrocastError::config("video fps must be non-zero"));
        }
        if video.card_segment_secs == 0 || video.map_segment_secs == 0 {
            return Err(RetrocastError::config("segment lengths must be non-zero"));
        }
        if video.map_frame_secs == 0 || video.map_segment_secs % video.map_frame_secs != 0 {
            return Err(RetrocastError::config(
                "map segment length must be a whole multiple of the map frame hold",
            ));
        }
        if video.crf > 51 {
            return Err(RetrocastError::config("crf must be between 0 and 51"));
        }
        if self.provider.request_timeout_secs == 0 {
            return Err(RetrocastError::config("request timeout must be non-zero"));
        }
        if self.locations.is_empty() {
            return Err(RetrocastError::config("no locations configured"));
        }

        let mut seen = HashSet::new();
        for location in &self.locations {
            if location.code.trim().is_empty() {
                return Err(RetrocastError::config(format!(
                    "location {} has an empty code",
                    location.name
                )));
            }
            if !seen.insert(location.code.as_str()) {
                return Err(RetrocastError::config(format!(
                    "duplicate location code {}",
                    location.code
                )));
            }
        }
        Ok(())
    }

    /// Locations selected by code (case-insensitive); all when `codes` is empty.
    pub fn select_locations(&self, codes: &[String]) -> RetrocastResult<Vec<LocationConfig>> {
        if codes.is_empty() {
            return Ok(self.locations.clone());
        }
        codes
            .iter()
            .map(|code| {
                self.locations
                    .iter()
                    .find(|l| l.code.eq_ignore_ascii_case(code))
                    .cloned()
                    .ok_or_else(|| RetrocastError::config(format!("unknown location {code}")))
            })
            .collect()
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("retrocast").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_video_contract() {
        let config = AppConfig::default();
        assert_eq!(config.video.width, 640);
        assert_eq!(config.video.height, 480);
        assert_eq!(config.video.fps, 30);
        assert_eq!(config.video.duration_secs(), 20);
        assert_eq!(config.video.map_frame_count(), 10);
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"output_dir": "/srv/wx", "video": {"crf": 20}}"#).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/srv/wx"));
        assert_eq!(config.video.crf, 20);
        assert_eq!(config.video.fps, 30);
        assert_eq!(config.locations.len(), 2);
    }

    #[test]
    fn test_api_key_is_never_serialized() {
        let mut config = AppConfig::default();
        config.provider.api_key = Some("secret".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_overrides_apply_key_and_output_dir() {
        let mut config = AppConfig::default();
        assert!(config.require_api_key().is_err());

        config.apply_overrides(Some(" abc123 ".to_string()), Some("/tmp/out".to_string()));
        assert_eq!(config.require_api_key().unwrap(), "abc123");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_blank_overrides_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(Some("  ".to_string()), Some(String::new()));
        assert!(config.provider.api_key.is_none());
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_validate_rejects_duplicate_codes() {
        let mut config = AppConfig::default();
        let dup = config.locations[0].clone();
        config.locations.push(dup);
        let err = config.validate().unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("duplicate location code ATX"));
    }

    #[test]
    fn test_validate_rejects_uneven_map_frames() {
        let mut config = AppConfig::default();
        config.video.map_frame_secs = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_select_locations_by_code() {
        let config = AppConfig::default();
        let selected = config.select_locations(&["ldn".to_string()]).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].code, "LDN");

        assert_eq!(config.select_locations(&[]).unwrap().len(), 2);
        assert!(config.select_locations(&["NYC".to_string()]).is_err());
    }

    #[test]
    fn test_load_from_reports_missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            AppConfig::load_from(&missing),
            Err(RetrocastError::FileNotFound { .. })
        ));

        let invalid = dir.path().join("bad.json");
        std::fs::write(&invalid, "{ not json").unwrap();
        assert!(AppConfig::load_from(&invalid).unwrap_err().is_fatal());
    }

    #[test]
    fn test_load_or_default_only_falls_back_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("config.json");
        let config = AppConfig::load_or_default(&missing).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("output"));

        std::fs::write(&missing, r#"{ "output_dir": 42, broken"#).unwrap();
        let err = AppConfig::load_or_default(&missing).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("config.json"));

        std::fs::write(&missing, r#"{ "output_dir": "/srv/wx" }"#).unwrap();
        let config = AppConfig::load_or_default(&missing).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/srv/wx"));
    }
}
