//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (UPFEED_*)
//! 2. TOML config file (if UPFEED_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::feed::SourceConfig;

mod validation;

pub use validation::ConfigError;

/// Default number of items kept after merging.
pub const DEFAULT_LIMIT: usize = 25;

/// Default number of cards shown before collapsing.
pub const DEFAULT_COLLAPSE_AFTER: i64 = 7;

/// Default number of grid rows shown before collapsing.
pub const DEFAULT_COLLAPSE_AFTER_ROWS: i64 = 4;

/// Runtime mode.
///
/// Development mode expires every cache entry immediately and turns on
/// verbose logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Production,
    Development,
}

impl Mode {
    pub fn is_development(self) -> bool {
        self == Mode::Development
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(self) -> &'static str {
        match self {
            Mode::Production => "error",
            Mode::Development => "debug",
        }
    }
}

/// Presentation style handed to the rendering layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayStyle {
    #[default]
    Default,
    GridCards,
    VerticalList,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (UPFEED_*)
/// 2. TOML config file (if UPFEED_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Sources to aggregate, in display order.
    #[serde(default)]
    pub sources: Vec<SourceConfig>,

    /// Default cache lifetime in seconds; 0 falls back to 2 hours.
    ///
    /// Set via UPFEED_UPDATE_EVERY_SECS environment variable.
    #[serde(default)]
    pub update_every_secs: u64,

    /// Maximum number of items in the merged feed; 0 means the default (25).
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Display style for the rendering layer.
    #[serde(default)]
    pub style: DisplayStyle,

    /// Cards shown before collapsing; -1 never collapses.
    #[serde(default = "default_collapse_after")]
    pub collapse_after: i64,

    /// Grid rows shown before collapsing; -1 never collapses.
    #[serde(default = "default_collapse_after_rows")]
    pub collapse_after_rows: i64,

    /// Runtime mode.
    ///
    /// Set via UPFEED_MODE environment variable (`production` or `development`).
    #[serde(default)]
    pub mode: Mode,

    /// Base URL of the upstream API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent string sent upstream.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Minimum spacing between consecutive upstream requests in milliseconds.
    #[serde(default = "default_request_spacing_ms")]
    pub request_spacing_ms: u64,

    /// Number of concurrent fetch workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Items requested per source.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

fn default_collapse_after() -> i64 {
    DEFAULT_COLLAPSE_AFTER
}

fn default_collapse_after_rows() -> i64 {
    DEFAULT_COLLAPSE_AFTER_ROWS
}

fn default_base_url() -> String {
    "https://api.bilibili.com".into()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36"
        .into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_request_spacing_ms() -> u64 {
    500
}

fn default_workers() -> usize {
    2
}

fn default_page_size() -> u32 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            update_every_secs: 0,
            limit: default_limit(),
            style: DisplayStyle::Default,
            collapse_after: default_collapse_after(),
            collapse_after_rows: default_collapse_after_rows(),
            mode: Mode::Production,
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            request_spacing_ms: default_request_spacing_ms(),
            workers: default_workers(),
            page_size: default_page_size(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Request spacing as Duration.
    pub fn request_spacing(&self) -> Duration {
        Duration::from_millis(self.request_spacing_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `UPFEED_`
    /// 2. TOML file from `UPFEED_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("UPFEED_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("UPFEED_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        let config = config.normalized();

        config.validate()?;

        Ok(config)
    }

    /// Replace unset or out-of-range display values with their defaults.
    ///
    /// `limit == 0` becomes 25; a collapse threshold of 0 or below -1 becomes
    /// its default, and -1 is kept as "never collapse".
    pub fn normalized(mut self) -> Self {
        if self.limit == 0 {
            self.limit = DEFAULT_LIMIT;
        }
        if self.collapse_after == 0 || self.collapse_after < -1 {
            self.collapse_after = DEFAULT_COLLAPSE_AFTER;
        }
        if self.collapse_after_rows == 0 || self.collapse_after_rows < -1 {
            self.collapse_after_rows = DEFAULT_COLLAPSE_AFTER_ROWS;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.sources.is_empty());
        assert_eq!(config.update_every_secs, 0);
        assert_eq!(config.limit, 25);
        assert_eq!(config.style, DisplayStyle::Default);
        assert_eq!(config.collapse_after, 7);
        assert_eq!(config.collapse_after_rows, 4);
        assert_eq!(config.mode, Mode::Production);
        assert_eq!(config.base_url, "https://api.bilibili.com");
        assert_eq!(config.request_spacing_ms, 500);
        assert_eq!(config.workers, 2);
        assert_eq!(config.page_size, 30);
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
        assert_eq!(config.request_spacing(), Duration::from_millis(500));
    }

    #[test]
    fn test_normalized() {
        let config = AppConfig { limit: 0, collapse_after: -5, collapse_after_rows: 0, ..Default::default() }.normalized();
        assert_eq!(config.limit, 25);
        assert_eq!(config.collapse_after, 7);
        assert_eq!(config.collapse_after_rows, 4);

        let config = AppConfig { limit: 3, collapse_after: -1, collapse_after_rows: 2, ..Default::default() }.normalized();
        assert_eq!(config.limit, 3);
        assert_eq!(config.collapse_after, -1);
        assert_eq!(config.collapse_after_rows, 2);
    }

    #[test]
    fn test_mode_log_filter() {
        assert_eq!(Mode::Production.default_log_filter(), "error");
        assert_eq!(Mode::Development.default_log_filter(), "debug");
        assert!(Mode::Development.is_development());
    }

    #[test]
    fn test_load_from_toml_and_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "upfeed.toml",
                r#"
                update_every_secs = 3600
                limit = 10
                style = "grid-cards"

                [[sources]]
                id = "946974"

                [[sources]]
                id = "1131457"
                update_every_secs = 600
                "#,
            )?;
            jail.set_env("UPFEED_CONFIG_FILE", "upfeed.toml");
            jail.set_env("UPFEED_MODE", "development");
            jail.set_env("UPFEED_LIMIT", "12");

            let config = AppConfig::load().expect("config should load");
            assert_eq!(config.sources.len(), 2);
            assert_eq!(config.sources[1].update_every_secs, 600);
            assert_eq!(config.update_every_secs, 3600);
            assert_eq!(config.style, DisplayStyle::GridCards);
            assert_eq!(config.mode, Mode::Development);
            assert_eq!(config.limit, 12);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        Jail::expect_with(|jail| {
            jail.set_env("UPFEED_WORKERS", "0");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { field, .. }) if field == "workers"));
            Ok(())
        });
    }
}
