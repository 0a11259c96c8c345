//! Best-effort discovery of every icon a site declares or serves.
//!
//! ### Discovery order
//! 1. `<link>` icons in the page's HTML (fetched with a browser User-Agent)
//! 2. Icons listed in the linked web app manifest, if any
//! 3. Conventional paths (`/favicon.ico`, `/apple-touch-icon.png`, ...) not
//!    already declared, probed concurrently
//!
//! Results are the union in that order, unranked. Declared and manifest
//! entries are kept as found; only conventional paths already present are
//! skipped.
//! A page that cannot be fetched yields an empty list; any later failure
//! keeps whatever was collected so far. The scanner never touches the cache.

pub mod links;
pub mod manifest;
pub mod probes;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use icondex_core::{AppConfig, Error};

use crate::fetch::{FetchOptions, TimedFetcher, canonicalize};

pub use links::{DeclaredIcons, declared_icons};
pub use manifest::{WebManifest, parse_manifest};
pub use probes::{CONVENTIONAL_PATHS, pending_probes, probe_all};

/// Size label used when a source declares none.
pub const UNKNOWN_SIZE: &str = "unknown";

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const MANIFEST_ACCEPT: &str = "application/manifest+json,application/json;q=0.9,*/*;q=0.5";

/// How a candidate was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateKind {
    AppleTouchIcon,
    Icon,
    Manifest,
    Probed,
}

impl CandidateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CandidateKind::AppleTouchIcon => "apple-touch-icon",
            CandidateKind::Icon => "icon",
            CandidateKind::Manifest => "manifest",
            CandidateKind::Probed => "probed",
        }
    }
}

/// A discovered icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconCandidate {
    /// Absolute icon URL
    pub url: String,
    /// Declared or nominal size, e.g. `"180x180"`, `"any"` or `"unknown"`
    pub size: String,
    #[serde(rename = "type")]
    pub kind: CandidateKind,
}

/// Scanner timeouts and identity.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// HTML page fetch timeout (default: 8s)
    pub page_timeout: Duration,
    /// Manifest fetch timeout (default: 5s)
    pub manifest_timeout: Duration,
    /// Per-path probe timeout (default: 3s)
    pub probe_timeout: Duration,
    /// User-Agent sent with the page fetch
    pub browser_user_agent: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let app = AppConfig::default();
        Self::from(&app)
    }
}

impl From<&AppConfig> for ScanConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            page_timeout: config.page_timeout(),
            manifest_timeout: config.manifest_timeout(),
            probe_timeout: config.path_probe_timeout(),
            browser_user_agent: config.browser_user_agent.clone(),
        }
    }
}

/// Site icon scanner.
#[derive(Debug, Clone)]
pub struct SiteScanner {
    fetcher: TimedFetcher,
    config: ScanConfig,
}

impl SiteScanner {
    pub fn new(fetcher: TimedFetcher, config: ScanConfig) -> Self {
        Self { fetcher, config }
    }

    /// Scan a site. Never fails; the list may be empty.
    pub async fn scan(&self, input: &str) -> Vec<IconCandidate> {
        let mut found = Vec::new();
        if let Err(e) = self.collect(input, &mut found).await {
            tracing::debug!(input, error = %e, collected = found.len(), "scan ended early");
        }
        found
    }

    async fn collect(&self, input: &str, found: &mut Vec<IconCandidate>) -> Result<(), Error> {
        let page_url = page_url(input)?;

        let options = FetchOptions::content(self.config.page_timeout)
            .with_user_agent(&self.config.browser_user_agent)
            .with_accept(HTML_ACCEPT);
        let page = self.fetcher.fetch(&page_url, &options).await?;

        let origin = page
            .final_url
            .join("/")
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let declared = declared_icons(&page.text(), &origin);
        found.extend(declared.icons);

        if let Some(manifest_url) = declared.manifest {
            match self.manifest_icons(&manifest_url).await {
                Ok(icons) => found.extend(icons),
                Err(e) => tracing::debug!(url = %manifest_url, error = %e, "skipping manifest"),
            }
        }

        let pending = pending_probes(&origin, found);
        let probed = probe_all(&self.fetcher, pending, self.config.probe_timeout).await;
        found.extend(probed);

        tracing::debug!(url = %page.final_url, candidates = found.len(), "scan complete");
        Ok(())
    }

    async fn manifest_icons(&self, manifest_url: &Url) -> Result<Vec<IconCandidate>, Error> {
        let options = FetchOptions::content(self.config.manifest_timeout).with_accept(MANIFEST_ACCEPT);
        let response = self.fetcher.fetch(manifest_url, &options).await?;
        let manifest = parse_manifest(&response.text())?;

        Ok(manifest.candidates(&response.final_url))
    }
}

/// The page URL a scan fetches: https by default, fragment dropped.
pub fn page_url(input: &str) -> Result<Url, Error> {
    canonicalize(input).map_err(|e| Error::InvalidUrl(e.to_string()))
}
