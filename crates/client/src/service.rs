//! The favicon service entry points.

use std::sync::Arc;

use icondex_core::{AppConfig, Error, FaviconStore};

use crate::fetch::{FetchConfig, TimedFetcher};
use crate::resolve::{FaviconResolver, ResolvedIcon, ResolverConfig};
use crate::scan::{IconCandidate, ScanConfig, SiteScanner};

/// Resolver and scanner sharing one HTTP client.
///
/// Built once at startup and shared by reference. None of the entry points
/// fail; errors below them are logged and collapsed.
#[derive(Clone)]
pub struct FaviconService {
    resolver: FaviconResolver,
    scanner: SiteScanner,
}

impl FaviconService {
    pub fn new(config: &AppConfig, store: Arc<dyn FaviconStore>) -> Result<Self, Error> {
        let fetcher = TimedFetcher::new(FetchConfig::from(config))?;
        let resolver = FaviconResolver::new(fetcher.clone(), store, ResolverConfig::from(config));
        let scanner = SiteScanner::new(fetcher, ScanConfig::from(config));
        Ok(Self { resolver, scanner })
    }

    /// Cached icon for the URL's domain, resolving it on a miss.
    pub async fn resolve_favicon(&self, url: &str) -> ResolvedIcon {
        self.resolver.resolve(url).await
    }

    /// Re-resolve the URL's domain, ignoring any cached record.
    pub async fn refresh_favicon(&self, url: &str) -> ResolvedIcon {
        self.resolver.refresh(url).await
    }

    /// Every icon the site declares or serves at a conventional path.
    pub async fn scan_site(&self, url: &str) -> Vec<IconCandidate> {
        self.scanner.scan(url).await
    }

    /// Drop the cached record for the URL's domain.
    pub async fn clear_favicon(&self, url: &str) -> bool {
        self.resolver.clear(url).await
    }
}
