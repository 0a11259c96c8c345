//! Provider waterfall resolution.
//!
//! A fresh cache record short-circuits everything. Otherwise providers are
//! tried strictly in order and the first one that answers `200` wins; later
//! providers are never contacted. When every provider fails the built-in
//! icon is cached instead, so a dead domain costs one waterfall per TTL.
//!
//! Resolution is total: cache failures are logged and treated as misses, and
//! every path ends in a usable icon reference.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use icondex_core::{AppConfig, FaviconRecord, FaviconStore, Provider};

use crate::default_icon::{DEFAULT_ICON_FORMAT, DEFAULT_ICON_SIZE, default_icon};
use crate::fetch::{FetchOptions, TimedFetcher, extract_domain};

/// Where a resolved icon came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "provider", rename_all = "snake_case")]
pub enum IconSource {
    Cache,
    Provider(String),
    Default,
}

/// A usable icon reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIcon {
    /// Absolute icon URL, or the fallback data URI.
    pub favicon_url: String,
    pub size: String,
    pub format: String,
    pub source: IconSource,
}

impl ResolvedIcon {
    /// The built-in fallback icon.
    pub fn fallback() -> Self {
        Self {
            favicon_url: default_icon().to_string(),
            size: DEFAULT_ICON_SIZE.to_string(),
            format: DEFAULT_ICON_FORMAT.to_string(),
            source: IconSource::Default,
        }
    }

    fn from_record(record: FaviconRecord) -> Self {
        Self { favicon_url: record.favicon_url, size: record.size, format: record.format, source: IconSource::Cache }
    }
}

/// Resolver settings.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Providers in priority order.
    pub providers: Vec<Provider>,
    /// Existence check timeout per provider (default: 5s)
    pub provider_timeout: Duration,
    /// Freshness window for cached records (default: 30 days)
    pub ttl: chrono::Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            providers: Provider::defaults(),
            provider_timeout: Duration::from_millis(5_000),
            ttl: chrono::Duration::days(30),
        }
    }
}

impl From<&AppConfig> for ResolverConfig {
    fn from(config: &AppConfig) -> Self {
        Self { providers: config.providers.clone(), provider_timeout: config.provider_timeout(), ttl: config.cache_ttl() }
    }
}

/// Cache-first favicon resolver.
#[derive(Clone)]
pub struct FaviconResolver {
    fetcher: TimedFetcher,
    store: Arc<dyn FaviconStore>,
    config: ResolverConfig,
}

impl FaviconResolver {
    pub fn new(fetcher: TimedFetcher, store: Arc<dyn FaviconStore>, config: ResolverConfig) -> Self {
        Self { fetcher, store, config }
    }

    /// Resolve the icon for any URL-ish input. Never fails.
    pub async fn resolve(&self, input: &str) -> ResolvedIcon {
        let Some(domain) = extract_domain(input) else {
            tracing::debug!(input, "no domain in input; using default icon");
            return ResolvedIcon::fallback();
        };

        if let Some(cached) = self.cached(&domain).await {
            tracing::debug!(%domain, "favicon cache hit");
            return cached;
        }

        self.run_waterfall(&domain).await
    }

    /// Drop any cached record, then resolve from providers unconditionally.
    pub async fn refresh(&self, input: &str) -> ResolvedIcon {
        let Some(domain) = extract_domain(input) else {
            return ResolvedIcon::fallback();
        };

        if let Err(e) = self.store.delete(&domain).await {
            tracing::warn!(%domain, error = %e, "failed to clear cached favicon before refresh");
        }

        self.run_waterfall(&domain).await
    }

    /// Remove the cached record for the input's domain.
    ///
    /// Returns false when there was nothing to remove or the store failed.
    pub async fn clear(&self, input: &str) -> bool {
        let Some(domain) = extract_domain(input) else {
            return false;
        };

        match self.store.delete(&domain).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(%domain, error = %e, "failed to clear cached favicon");
                false
            }
        }
    }

    async fn cached(&self, domain: &str) -> Option<ResolvedIcon> {
        match self.store.get(domain).await {
            Ok(Some(record)) if !record.is_stale(self.config.ttl, Utc::now()) => Some(ResolvedIcon::from_record(record)),
            Ok(Some(record)) => {
                tracing::debug!(domain, last_checked_at = %record.last_checked_at, "cached favicon is stale");
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(domain, error = %e, "favicon cache lookup failed; treating as miss");
                None
            }
        }
    }

    async fn run_waterfall(&self, domain: &str) -> ResolvedIcon {
        let icon = match self.first_available(domain).await {
            Some(icon) => icon,
            None => {
                tracing::info!(domain, providers = self.config.providers.len(), "no provider served an icon");
                ResolvedIcon::fallback()
            }
        };

        if let Err(e) = self
            .store
            .upsert(domain, &icon.favicon_url, &icon.size, &icon.format)
            .await
        {
            tracing::warn!(domain, error = %e, "failed to cache favicon");
        }

        icon
    }

    async fn first_available(&self, domain: &str) -> Option<ResolvedIcon> {
        let options = FetchOptions::exists(self.config.provider_timeout);

        for provider in &self.config.providers {
            let candidate = provider.url_for(domain);
            let url = match Url::parse(&candidate) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(provider = %provider.name, url = %candidate, error = %e, "provider template produced an invalid URL");
                    continue;
                }
            };

            match self.fetcher.fetch(&url, &options).await {
                Ok(outcome) => {
                    tracing::debug!(domain, provider = %provider.name, url = %outcome.final_url, "provider served favicon");
                    return Some(ResolvedIcon {
                        favicon_url: outcome.final_url.to_string(),
                        size: provider.size.clone(),
                        format: provider.format.clone(),
                        source: IconSource::Provider(provider.name.clone()),
                    });
                }
                Err(failure) => {
                    tracing::debug!(domain, provider = %provider.name, reason = %failure, "provider failed");
                }
            }
        }

        None
    }
}
