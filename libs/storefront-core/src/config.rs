//! Configuration for connecting to the hosted storefront backend

use crate::error::{Result, StorefrontError};
use chrono::{FixedOffset, Local, Offset};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use storefront_common::{
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOP_LIMIT, DEFAULT_TREND_DAYS, LOW_STOCK_THRESHOLD,
    MAX_TREND_DAYS,
};
use tracing::{debug, info, warn};

/// Settings for the storefront services and their backend connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Base URL of the hosted project, e.g. `https://xyz.supabase.co`
    pub api_url: String,
    /// Public (anon) API key sent with every request
    pub api_key: String,
    pub request_timeout_secs: u64,
    /// Products at or below this stock level count as low stock
    pub low_stock_threshold: i64,
    /// Days covered by the dashboard sales trend
    pub trend_days: u32,
    /// Rows in the dashboard "top" lists
    pub top_limit: usize,
    /// Offset of the operator's calendar from UTC, in minutes; `None` uses the host's
    pub utc_offset_minutes: Option<i32>,
    pub log_level: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            low_stock_threshold: LOW_STOCK_THRESHOLD,
            trend_days: DEFAULT_TREND_DAYS,
            top_limit: DEFAULT_TOP_LIMIT,
            utc_offset_minutes: None,
            log_level: "info".to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Configuration pointing at a backend, with every other setting defaulted
    #[must_use]
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Read settings from `STOREFRONT_*` environment variables on top of the defaults
    ///
    /// # Errors
    /// Returns `Configuration` if a numeric variable does not parse
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("STOREFRONT_API_URL") {
            config.api_url = url;
        }
        if let Ok(key) = std::env::var("STOREFRONT_API_KEY") {
            config.api_key = key;
        }
        if let Ok(timeout) = std::env::var("STOREFRONT_REQUEST_TIMEOUT") {
            config.request_timeout_secs = timeout.parse().map_err(|_| {
                StorefrontError::configuration("Invalid STOREFRONT_REQUEST_TIMEOUT value")
            })?;
        }
        if let Ok(threshold) = std::env::var("STOREFRONT_LOW_STOCK_THRESHOLD") {
            config.low_stock_threshold = threshold.parse().map_err(|_| {
                StorefrontError::configuration("Invalid STOREFRONT_LOW_STOCK_THRESHOLD value")
            })?;
        }
        if let Ok(offset) = std::env::var("STOREFRONT_UTC_OFFSET_MINUTES") {
            config.utc_offset_minutes = Some(offset.parse().map_err(|_| {
                StorefrontError::configuration("Invalid STOREFRONT_UTC_OFFSET_MINUTES value")
            })?);
        }
        if let Ok(level) = std::env::var("STOREFRONT_LOG_LEVEL") {
            config.log_level = level.to_lowercase();
        }

        Ok(config)
    }

    /// Load configuration from a JSON or YAML file (chosen by extension)
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be read or `Configuration` if it does not parse
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            StorefrontError::Io(std::io::Error::other(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            )))
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml" | "yml")
        );
        if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| {
                StorefrontError::configuration(format!("Failed to parse YAML config: {e}"))
            })
        } else {
            serde_json::from_str(&content).map_err(|e| {
                StorefrontError::configuration(format!("Failed to parse JSON config: {e}"))
            })
        }
    }

    /// Overlay the settings of `other` that differ from the defaults
    pub fn merge_with(&mut self, other: &Self) {
        let defaults = Self::default();
        if !other.api_url.is_empty() {
            self.api_url.clone_from(&other.api_url);
        }
        if !other.api_key.is_empty() {
            self.api_key.clone_from(&other.api_key);
        }
        if other.request_timeout_secs != defaults.request_timeout_secs {
            self.request_timeout_secs = other.request_timeout_secs;
        }
        if other.low_stock_threshold != defaults.low_stock_threshold {
            self.low_stock_threshold = other.low_stock_threshold;
        }
        if other.trend_days != defaults.trend_days {
            self.trend_days = other.trend_days;
        }
        if other.top_limit != defaults.top_limit {
            self.top_limit = other.top_limit;
        }
        if other.utc_offset_minutes.is_some() {
            self.utc_offset_minutes = other.utc_offset_minutes;
        }
        if other.log_level != defaults.log_level {
            self.log_level.clone_from(&other.log_level);
        }
    }

    /// Check the settings needed for local services
    ///
    /// # Errors
    /// Returns `Configuration` describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(StorefrontError::configuration(
                "Request timeout must be greater than 0",
            ));
        }
        if self.trend_days == 0 || self.trend_days > MAX_TREND_DAYS {
            return Err(StorefrontError::configuration(format!(
                "Trend days must be between 1 and {MAX_TREND_DAYS}"
            )));
        }
        if self.top_limit == 0 {
            return Err(StorefrontError::configuration(
                "Top list limit must be greater than 0",
            ));
        }
        if self.low_stock_threshold < 0 {
            return Err(StorefrontError::configuration(
                "Low stock threshold cannot be negative",
            ));
        }
        if let Some(minutes) = self.utc_offset_minutes {
            if minutes.abs() >= 24 * 60 {
                return Err(StorefrontError::configuration(format!(
                    "UTC offset of {minutes} minutes is out of range"
                )));
            }
        }
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(StorefrontError::configuration(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }
        Ok(())
    }

    /// Check the settings needed to reach the hosted backend
    ///
    /// # Errors
    /// Returns `Configuration` if the URL or key is missing or the URL is not HTTP(S)
    pub fn validate_remote(&self) -> Result<()> {
        self.validate()?;
        if self.api_url.is_empty() {
            return Err(StorefrontError::configuration("API URL is not set"));
        }
        if !(self.api_url.starts_with("https://") || self.api_url.starts_with("http://")) {
            return Err(StorefrontError::configuration(format!(
                "API URL must start with http:// or https://: {}",
                self.api_url
            )));
        }
        if self.api_key.is_empty() {
            return Err(StorefrontError::configuration("API key is not set"));
        }
        Ok(())
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The operator's UTC offset: the configured one, or the host's current offset
    #[must_use]
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
            .unwrap_or_else(|| Local::now().offset().fix())
    }
}

/// Loads configuration from defaults, files and the environment, in rising precedence
pub struct ConfigLoader {
    base_config: StorefrontConfig,
    config_paths: Vec<PathBuf>,
    load_from_env: bool,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_config: StorefrontConfig::default(),
            config_paths: Self::default_config_paths(),
            load_from_env: true,
        }
    }

    #[must_use]
    pub fn with_base_config(mut self, config: StorefrontConfig) -> Self {
        self.base_config = config;
        self
    }

    /// Replace the configuration file search list
    #[must_use]
    pub fn with_config_paths<P: AsRef<Path>>(mut self, paths: Vec<P>) -> Self {
        self.config_paths = paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();
        self
    }

    #[must_use]
    pub fn with_env_loading(mut self, enabled: bool) -> Self {
        self.load_from_env = enabled;
        self
    }

    /// Load and validate the layered configuration
    ///
    /// Unreadable files are skipped with a warning; an invalid environment
    /// variable or an invalid final configuration is an error.
    ///
    /// # Errors
    /// Returns `Configuration` if the result does not validate
    pub fn load(&self) -> Result<StorefrontConfig> {
        let mut config = self.base_config.clone();

        for path in &self.config_paths {
            if !path.exists() {
                debug!("Configuration file not found: {}", path.display());
                continue;
            }
            match StorefrontConfig::from_file(path) {
                Ok(file_config) => {
                    config.merge_with(&file_config);
                    info!("Loaded configuration from: {}", path.display());
                }
                Err(e) => warn!("Failed to load configuration from {}: {}", path.display(), e),
            }
        }

        if self.load_from_env {
            config.merge_with(&StorefrontConfig::from_env()?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Files tried by default: the working directory, then the user config directory
    #[must_use]
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("storefront.json"),
            PathBuf::from("storefront.yaml"),
            PathBuf::from("storefront.yml"),
        ];
        if let Ok(home) = std::env::var("HOME") {
            let dir = PathBuf::from(home).join(".config").join("storefront");
            paths.push(dir.join("config.json"));
            paths.push(dir.join("config.yaml"));
        }
        paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::default();
        assert_eq!(config.low_stock_threshold, 5);
        assert_eq!(config.trend_days, 7);
        assert_eq!(config.top_limit, 5);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
        assert!(config.validate_remote().is_err());
    }

    #[test]
    fn test_validate_remote() {
        let config = StorefrontConfig::new("https://demo.supabase.co", "anon-key");
        assert!(config.validate_remote().is_ok());

        let bad_scheme = StorefrontConfig::new("demo.supabase.co", "anon-key");
        assert!(bad_scheme.validate_remote().is_err());

        let no_key = StorefrontConfig::new("https://demo.supabase.co", "");
        assert!(no_key.validate_remote().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = StorefrontConfig::default();
        config.log_level = "loud".into();
        assert!(config.validate().is_err());

        let mut config = StorefrontConfig::default();
        config.utc_offset_minutes = Some(24 * 60);
        assert!(config.validate().is_err());

        let mut config = StorefrontConfig::default();
        config.trend_days = 0;
        assert!(config.validate().is_err());

        let mut config = StorefrontConfig::default();
        config.trend_days = 30_000_000;
        assert!(config.validate().is_err());
        config.trend_days = MAX_TREND_DAYS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_utc_offset_override() {
        let mut config = StorefrontConfig::default();
        config.utc_offset_minutes = Some(7 * 60);
        assert_eq!(config.utc_offset().local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "api_url: https://demo.supabase.co\napi_key: anon\nlow_stock_threshold: 3"
        )
        .unwrap();

        let config = StorefrontConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api_url, "https://demo.supabase.co");
        assert_eq!(config.low_stock_threshold, 3);
        assert_eq!(config.trend_days, 7);
    }

    #[test]
    fn test_from_json_file_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            StorefrontConfig::from_file(file.path()),
            Err(StorefrontError::Configuration { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            StorefrontConfig::from_file("/nonexistent/storefront.json"),
            Err(StorefrontError::Io(_))
        ));
    }

    #[test]
    fn test_merge_keeps_base_for_defaults() {
        let mut base = StorefrontConfig::new("https://a.example.com", "key-a");
        base.top_limit = 10;
        let mut overlay = StorefrontConfig::default();
        overlay.api_key = "key-b".into();
        overlay.utc_offset_minutes = Some(420);

        base.merge_with(&overlay);
        assert_eq!(base.api_url, "https://a.example.com");
        assert_eq!(base.api_key, "key-b");
        assert_eq!(base.top_limit, 10);
        assert_eq!(base.utc_offset_minutes, Some(420));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("STOREFRONT_API_URL", "https://env.supabase.co");
        std::env::set_var("STOREFRONT_LOW_STOCK_THRESHOLD", "2");
        let config = StorefrontConfig::from_env().unwrap();
        std::env::remove_var("STOREFRONT_API_URL");
        std::env::remove_var("STOREFRONT_LOW_STOCK_THRESHOLD");

        assert_eq!(config.api_url, "https://env.supabase.co");
        assert_eq!(config.low_stock_threshold, 2);
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_number() {
        std::env::set_var("STOREFRONT_REQUEST_TIMEOUT", "soon");
        let result = StorefrontConfig::from_env();
        std::env::remove_var("STOREFRONT_REQUEST_TIMEOUT");
        assert!(matches!(result, Err(StorefrontError::Configuration { .. })));
    }

    #[test]
    #[serial]
    fn test_loader_layers_file_under_env() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"api_url": "https://file.supabase.co", "api_key": "file-key", "top_limit": 3}}"#
        )
        .unwrap();

        std::env::set_var("STOREFRONT_API_KEY", "env-key");
        let config = ConfigLoader::new()
            .with_config_paths(vec![file.path()])
            .load();
        std::env::remove_var("STOREFRONT_API_KEY");

        let config = config.unwrap();
        assert_eq!(config.api_url, "https://file.supabase.co");
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.top_limit, 3);
    }
}
