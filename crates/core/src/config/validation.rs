//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use crate::provider::DOMAIN_PLACEHOLDER;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

/// Ten years.
const MAX_CACHE_TTL_DAYS: i64 = 3_650;

fn check_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if value < 100 {
        return Err(ConfigError::Invalid { field: field.into(), reason: "must be at least 100ms".into() });
    }
    if value > 300_000 {
        return Err(ConfigError::Invalid { field: field.into(), reason: "must not exceed 5 minutes (300000ms)".into() });
    }
    Ok(())
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - any timeout is below 100ms or above 5 minutes
    /// - `max_redirects` exceeds 20
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `cache_ttl_days` is below 1 or above 3650
    /// - either user agent is empty
    /// - the provider list is empty or a template lacks `{domain}`
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_timeout("provider_timeout_ms", self.provider_timeout_ms)?;
        check_timeout("page_timeout_ms", self.page_timeout_ms)?;
        check_timeout("manifest_timeout_ms", self.manifest_timeout_ms)?;
        check_timeout("path_probe_timeout_ms", self.path_probe_timeout_ms)?;

        if self.max_redirects > 20 {
            return Err(ConfigError::Invalid { field: "max_redirects".into(), reason: "must not exceed 20".into() });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.cache_ttl_days < 1 {
            return Err(ConfigError::Invalid { field: "cache_ttl_days".into(), reason: "must be at least 1".into() });
        }
        if self.cache_ttl_days > MAX_CACHE_TTL_DAYS {
            return Err(ConfigError::Invalid {
                field: "cache_ttl_days".into(),
                reason: format!("must not exceed {MAX_CACHE_TTL_DAYS}"),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }
        if self.browser_user_agent.is_empty() {
            return Err(ConfigError::Invalid {
                field: "browser_user_agent".into(),
                reason: "must not be empty".into(),
            });
        }

        if self.providers.is_empty() {
            return Err(ConfigError::Invalid { field: "providers".into(), reason: "must not be empty".into() });
        }
        if let Some(bad) = self.providers.iter().find(|p| !p.template.contains(DOMAIN_PLACEHOLDER)) {
            return Err(ConfigError::Invalid {
                field: "providers".into(),
                reason: format!("template for '{}' is missing {DOMAIN_PLACEHOLDER}", bad.name),
            });
        }

        if self.allow_private_hosts {
            tracing::warn!("allow_private_hosts is set; SSRF address checks are disabled");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { provider_timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "provider_timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { page_timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "page_timeout_ms"));
    }

    #[test]
    fn test_validate_redirect_cap() {
        let config = AppConfig { max_redirects: 21, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_redirects"));

        let config = AppConfig { max_redirects: 0, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_max_bytes_zero() {
        let config = AppConfig { max_bytes: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_bytes"));
    }

    #[test]
    fn test_validate_ttl() {
        let config = AppConfig { cache_ttl_days: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_ttl_days"));
    }

    #[test]
    fn test_validate_ttl_upper_bound() {
        let config = AppConfig { cache_ttl_days: MAX_CACHE_TTL_DAYS, ..Default::default() };
        assert!(config.validate().is_ok());

        for days in [MAX_CACHE_TTL_DAYS + 1, i64::MAX] {
            let config = AppConfig { cache_ttl_days: days, ..Default::default() };
            let result = config.validate();
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_ttl_days"));
        }
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_empty_providers() {
        let config = AppConfig { providers: Vec::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "providers"));
    }

    #[test]
    fn test_validate_template_without_placeholder() {
        let config = AppConfig {
            providers: vec![Provider::new("static", "https://cdn.example.com/icon.png", "32", "png")],
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { reason, .. }) if reason.contains("static")));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            provider_timeout_ms: 100,
            path_probe_timeout_ms: 300_000,
            max_bytes: 1,
            cache_ttl_days: 1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
