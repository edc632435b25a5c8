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

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `version`, `cache_prefix` or
    /// `static_resources` is empty, and `ConfigError::Invalid` if:
    /// - `version` or `cache_prefix` contains whitespace
    /// - a static resource is not root-relative or is listed twice
    /// - `origin` is not an http(s) URL
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `install_timeout_ms` is below `timeout_ms` or exceeds 30 minutes
    /// - `max_concurrency` is 0 or exceeds 16
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.is_empty() {
            return Err(ConfigError::Missing { field: "version".into(), hint: "Set SHELLCACHE_VERSION".into() });
        }
        if self.cache_prefix.is_empty() {
            return Err(ConfigError::Missing {
                field: "cache_prefix".into(),
                hint: "Set SHELLCACHE_CACHE_PREFIX".into(),
            });
        }
        if self.version.chars().any(char::is_whitespace) {
            return Err(invalid("version", "must not contain whitespace"));
        }
        if self.cache_prefix.chars().any(char::is_whitespace) {
            return Err(invalid("cache_prefix", "must not contain whitespace"));
        }

        if self.static_resources.is_empty() {
            return Err(ConfigError::Missing {
                field: "static_resources".into(),
                hint: "List at least the app shell \"/\"".into(),
            });
        }
        let mut seen = HashSet::new();
        for path in &self.static_resources {
            if !path.starts_with('/') {
                return Err(invalid("static_resources", format!("{path} must start with '/'")));
            }
            if path.starts_with("//") {
                return Err(invalid("static_resources", format!("{path} is protocol-relative")));
            }
            if !seen.insert(path.as_str()) {
                return Err(invalid("static_resources", format!("{path} is listed twice")));
            }
        }
        if !seen.contains("/") {
            tracing::warn!("static_resources does not include \"/\"; navigations will get 404 responses");
        }

        self.origin_url()?;

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.install_timeout_ms < self.timeout_ms {
            return Err(invalid("install_timeout_ms", "must be at least timeout_ms"));
        }
        if self.install_timeout_ms > 1_800_000 {
            return Err(invalid("install_timeout_ms", "must not exceed 30 minutes (1800000ms)"));
        }

        if self.max_concurrency == 0 || self.max_concurrency > 16 {
            return Err(invalid("max_concurrency", "must be between 1 and 16"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_field(config: &AppConfig) -> Option<String> {
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_version() {
        let config = AppConfig { version: String::new(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Missing { field, .. }) if field == "version"));
    }

    #[test]
    fn test_validate_version_whitespace() {
        let config = AppConfig { version: "v 2".into(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("version"));
    }

    #[test]
    fn test_validate_empty_resources() {
        let config = AppConfig { static_resources: vec![], ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Missing { field, .. }) if field == "static_resources"));
    }

    #[test]
    fn test_validate_relative_resource() {
        let config = AppConfig { static_resources: vec!["/".into(), "app.js".into()], ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("static_resources"));
    }

    #[test]
    fn test_validate_protocol_relative_resource() {
        let config = AppConfig { static_resources: vec!["/".into(), "//cdn.evil/x".into()], ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("static_resources"));
    }

    #[test]
    fn test_validate_duplicate_resource() {
        let config = AppConfig { static_resources: vec!["/".into(), "/".into()], ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("static_resources"));
    }

    #[test]
    fn test_validate_bad_origin() {
        let config = AppConfig { origin: "not a url".into(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("origin"));
    }

    #[test]
    fn test_validate_max_bytes_zero() {
        let config = AppConfig { max_bytes: 0, ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("max_bytes"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("timeout_ms"));
    }

    #[test]
    fn test_validate_install_timeout_below_fetch_timeout() {
        let config = AppConfig { install_timeout_ms: 10_000, ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("install_timeout_ms"));
    }

    #[test]
    fn test_validate_concurrency_bounds() {
        let config = AppConfig { max_concurrency: 0, ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("max_concurrency"));

        let config = AppConfig { max_concurrency: 17, ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("max_concurrency"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("user_agent"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            max_bytes: 1,
            timeout_ms: 100,
            install_timeout_ms: 100,
            max_concurrency: 1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
