//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use std::collections::HashSet;

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `workers` is 0
    /// - `page_size` is outside 1..=50
    /// - `user_agent` or `base_url` is empty
    /// - a source id is empty or not numeric
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.workers == 0 {
            return Err(ConfigError::Invalid { field: "workers".into(), reason: "must be at least 1".into() });
        }

        if !(1..=50).contains(&self.page_size) {
            return Err(ConfigError::Invalid { field: "page_size".into(), reason: "must be between 1 and 50".into() });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.base_url.is_empty() {
            return Err(ConfigError::Invalid { field: "base_url".into(), reason: "must not be empty".into() });
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            let id = source.id.as_str();
            if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
                return Err(ConfigError::Invalid {
                    field: "sources".into(),
                    reason: format!("source id {id:?} must be a non-empty numeric id"),
                });
            }
            if !seen.insert(id) {
                tracing::warn!(source = id, "source listed more than once; it will be fetched once per pass");
            }
        }

        Ok(())
    }

    /// Require at least one configured source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no sources are configured.
    pub fn require_sources(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::Missing {
                field: "sources".into(),
                hint: "Add [[sources]] entries to the file named by UPFEED_CONFIG_FILE".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::SourceConfig;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_zero_workers() {
        let config = AppConfig { workers: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "workers"));
    }

    #[test]
    fn test_validate_page_size() {
        let config = AppConfig { page_size: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "page_size"));

        let config = AppConfig { page_size: 51, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "page_size"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_source_ids() {
        let config = AppConfig { sources: vec![SourceConfig::new("946974")], ..Default::default() };
        assert!(config.validate().is_ok());

        let config = AppConfig { sources: vec![SourceConfig::new("")], ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "sources"));

        let config = AppConfig { sources: vec![SourceConfig::new("abc")], ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "sources"));
    }

    #[test]
    fn test_duplicate_sources_are_allowed() {
        let config =
            AppConfig { sources: vec![SourceConfig::new("1"), SourceConfig::new("1")], ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_require_sources() {
        let config = AppConfig::default();
        assert!(matches!(config.require_sources(), Err(ConfigError::Missing { .. })));

        let config = AppConfig { sources: vec![SourceConfig::new("1")], ..Default::default() };
        assert!(config.require_sources().is_ok());
    }
}
