//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (ICONDEX_*)
//! 2. TOML config file (if ICONDEX_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::provider::Provider;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (ICONDEX_*)
/// 2. TOML config file (if ICONDEX_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite favicon cache database.
    ///
    /// Set via ICONDEX_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent for provider and probe requests.
    ///
    /// Set via ICONDEX_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// User-Agent sent when fetching a site's HTML during scans.
    ///
    /// Some sites vary their markup by agent, so this mimics a desktop browser.
    #[serde(default = "default_browser_user_agent")]
    pub browser_user_agent: String,

    /// Per-provider existence check timeout in milliseconds.
    #[serde(default = "default_provider_timeout_ms")]
    pub provider_timeout_ms: u64,

    /// HTML page fetch timeout in milliseconds.
    #[serde(default = "default_page_timeout_ms")]
    pub page_timeout_ms: u64,

    /// Web app manifest fetch timeout in milliseconds.
    #[serde(default = "default_manifest_timeout_ms")]
    pub manifest_timeout_ms: u64,

    /// Conventional icon path probe timeout in milliseconds.
    #[serde(default = "default_path_probe_timeout_ms")]
    pub path_probe_timeout_ms: u64,

    /// Maximum redirect hops followed per fetch.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Maximum body bytes read by content-mode fetches.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Days before a cached favicon is considered stale.
    #[serde(default = "default_cache_ttl_days")]
    pub cache_ttl_days: i64,

    /// Allow fetching hosts on private, loopback or link-local addresses.
    ///
    /// Set via ICONDEX_ALLOW_PRIVATE_HOSTS environment variable.
    #[serde(default)]
    pub allow_private_hosts: bool,

    /// Icon providers in priority order.
    #[serde(default = "Provider::defaults")]
    pub providers: Vec<Provider>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./icondex-cache.sqlite")
}

fn default_user_agent() -> String {
    "icondex/0.1".into()
}

fn default_browser_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
        .into()
}

fn default_provider_timeout_ms() -> u64 {
    5_000
}

fn default_page_timeout_ms() -> u64 {
    8_000
}

fn default_manifest_timeout_ms() -> u64 {
    5_000
}

fn default_path_probe_timeout_ms() -> u64 {
    3_000
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_cache_ttl_days() -> i64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            browser_user_agent: default_browser_user_agent(),
            provider_timeout_ms: default_provider_timeout_ms(),
            page_timeout_ms: default_page_timeout_ms(),
            manifest_timeout_ms: default_manifest_timeout_ms(),
            path_probe_timeout_ms: default_path_probe_timeout_ms(),
            max_redirects: default_max_redirects(),
            max_bytes: default_max_bytes(),
            cache_ttl_days: default_cache_ttl_days(),
            allow_private_hosts: false,
            providers: Provider::defaults(),
        }
    }
}

impl AppConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.page_timeout_ms)
    }

    pub fn manifest_timeout(&self) -> Duration {
        Duration::from_millis(self.manifest_timeout_ms)
    }

    pub fn path_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.path_probe_timeout_ms)
    }

    /// Freshness window for cached records.
    ///
    /// Saturates instead of panicking for values `validate()` would reject.
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::TimeDelta::try_days(self.cache_ttl_days).unwrap_or(chrono::TimeDelta::MAX)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `ICONDEX_`
    /// 2. TOML file from `ICONDEX_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("ICONDEX_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("ICONDEX_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./icondex-cache.sqlite"));
        assert_eq!(config.user_agent, "icondex/0.1");
        assert!(config.browser_user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.provider_timeout_ms, 5_000);
        assert_eq!(config.page_timeout_ms, 8_000);
        assert_eq!(config.manifest_timeout_ms, 5_000);
        assert_eq!(config.path_probe_timeout_ms, 3_000);
        assert_eq!(config.max_redirects, 5);
        assert_eq!(config.cache_ttl_days, 30);
        assert!(!config.allow_private_hosts);
        assert_eq!(config.providers, Provider::defaults());
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.provider_timeout(), Duration::from_millis(5_000));
        assert_eq!(config.page_timeout(), Duration::from_millis(8_000));
        assert_eq!(config.manifest_timeout(), Duration::from_millis(5_000));
        assert_eq!(config.path_probe_timeout(), Duration::from_millis(3_000));
        assert_eq!(config.cache_ttl(), chrono::Duration::days(30));
    }

    #[test]
    fn test_cache_ttl_out_of_range_saturates() {
        let config = AppConfig { cache_ttl_days: i64::MAX, ..Default::default() };
        assert_eq!(config.cache_ttl(), chrono::TimeDelta::MAX);
    }

    #[test]
    fn test_load_rejects_huge_ttl() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ICONDEX_CACHE_TTL_DAYS", "200000000");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { .. })));
            Ok(())
        });
    }

    #[test]
    fn test_load_env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ICONDEX_PROVIDER_TIMEOUT_MS", "1500");
            jail.set_env("ICONDEX_ALLOW_PRIVATE_HOSTS", "true");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.provider_timeout_ms, 1_500);
            assert!(config.allow_private_hosts);
            assert_eq!(config.page_timeout_ms, 8_000);
            Ok(())
        });
    }

    #[test]
    fn test_load_toml_providers() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "icondex.toml",
                r#"
                cache_ttl_days = 7

                [[providers]]
                name = "only"
                template = "https://icons.example.net/{domain}.png"
                size = "64"
                format = "png"
                "#,
            )?;
            jail.set_env("ICONDEX_CONFIG_FILE", "icondex.toml");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.cache_ttl_days, 7);
            assert_eq!(config.providers.len(), 1);
            assert_eq!(config.providers[0].name, "only");
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ICONDEX_MAX_REDIRECTS", "100");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { .. })));
            Ok(())
        });
    }
}
