//! favicon_resolve tool implementation.
//!
//! Resolves the single best-effort icon for a URL through the cache and the
//! provider waterfall.

use chrono::Utc;
use icondex_client::{FaviconService, IconSource, ResolvedIcon, extract_domain};
use icondex_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input parameters for the favicon_resolve tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FaviconResolveParams {
    /// Any URL or bare hostname, e.g. "https://github.com/rust-lang" or "github.com".
    pub url: String,

    /// Ignore and replace the cached record for the domain.
    #[serde(default)]
    pub force_refresh: bool,
}

/// Output structure for the favicon_resolve tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FaviconResolveOutput {
    /// The input URL as given.
    pub url: String,
    /// Domain key the icon is cached under; absent when the input has no host.
    pub domain: Option<String>,
    /// Absolute icon URL or a `data:` URI for the fallback icon.
    pub favicon_url: String,
    pub size: String,
    pub format: String,
    /// "cache", "provider" or "default".
    pub source: String,
    /// Provider name when `source` is "provider".
    pub provider: Option<String>,
    /// ISO8601 timestamp of this response.
    pub resolved_at: String,
}

impl FaviconResolveOutput {
    fn new(url: String, icon: ResolvedIcon) -> Self {
        let (source, provider) = match icon.source {
            IconSource::Cache => ("cache", None),
            IconSource::Provider(name) => ("provider", Some(name)),
            IconSource::Default => ("default", None),
        };

        Self {
            domain: extract_domain(&url),
            url,
            favicon_url: icon.favicon_url,
            size: icon.size,
            format: icon.format,
            source: source.to_string(),
            provider,
            resolved_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Implementation of the favicon_resolve tool.
pub async fn resolve_impl(service: &FaviconService, params: FaviconResolveParams) -> Result<CallToolResult, McpError> {
    let icon = if params.force_refresh {
        service.refresh_favicon(&params.url).await
    } else {
        service.resolve_favicon(&params.url).await
    };

    let output = FaviconResolveOutput::new(params.url, icon);
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::output_text;
    use icondex_client::default_icon;
    use icondex_core::{AppConfig, CacheDb, FaviconRecord, Provider};
    use std::sync::Arc;

    async fn service_with(cache: &CacheDb) -> FaviconService {
        // Unroutable provider; anything not cached falls through to the default icon.
        let config = AppConfig {
            provider_timeout_ms: 200,
            providers: vec![Provider::new("dead", "http://127.0.0.1:1/{domain}.png", "32", "png")],
            allow_private_hosts: true,
            ..Default::default()
        };
        FaviconService::new(&config, Arc::new(cache.clone())).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_impl_from_cache() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        cache
            .upsert_favicon(&FaviconRecord::new("example.com", "https://cdn.test/e.png", "64", "png"))
            .await
            .unwrap();
        let service = service_with(&cache).await;

        let params = FaviconResolveParams { url: "https://example.com/about".into(), force_refresh: false };
        let result = resolve_impl(&service, params).await.unwrap();
        let output: FaviconResolveOutput = serde_json::from_str(&output_text(&result)).unwrap();

        assert_eq!(output.domain.as_deref(), Some("example.com"));
        assert_eq!(output.favicon_url, "https://cdn.test/e.png");
        assert_eq!(output.source, "cache");
        assert!(output.provider.is_none());
    }

    #[tokio::test]
    async fn test_resolve_impl_force_refresh_replaces_record() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        cache
            .upsert_favicon(&FaviconRecord::new("example.com", "https://cdn.test/e.png", "64", "png"))
            .await
            .unwrap();
        let service = service_with(&cache).await;

        let params = FaviconResolveParams { url: "example.com".into(), force_refresh: true };
        let result = resolve_impl(&service, params).await.unwrap();
        let output: FaviconResolveOutput = serde_json::from_str(&output_text(&result)).unwrap();

        assert_eq!(output.source, "default");
        assert_eq!(output.favicon_url, default_icon());

        let record = cache.get_favicon("example.com").await.unwrap().unwrap();
        assert_eq!(record.size, "default");
    }

    #[tokio::test]
    async fn test_resolve_impl_garbage_input() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let service = service_with(&cache).await;

        let params = FaviconResolveParams { url: "".into(), force_refresh: false };
        let result = resolve_impl(&service, params).await.unwrap();
        let output: FaviconResolveOutput = serde_json::from_str(&output_text(&result)).unwrap();

        assert!(output.domain.is_none());
        assert_eq!(output.favicon_url, default_icon());
        assert_eq!(cache.count_favicons().await.unwrap(), 0);
    }
}
