//! cache_purge tool implementation.
//!
//! Purges favicon records by age, domain, or count.

use icondex_client::extract_domain;
use icondex_core::{CacheDb, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Purge records last checked more than this many days ago.
    pub older_than_days: Option<i64>,

    /// Purge the record for this domain (or any URL on it).
    pub domain: Option<String>,

    /// Keep only the newest N records.
    pub max_entries: Option<usize>,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of records deleted.
    pub deleted: u64,
    /// Records left in the cache.
    pub remaining: u64,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(cache: &CacheDb, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    if params.older_than_days.is_none() && params.domain.is_none() && params.max_entries.is_none() {
        return Err(Error::InvalidInput(
            "At least one of older_than_days, domain, or max_entries must be specified".to_string(),
        )
        .into());
    }

    let mut deleted_total = 0u64;

    if let Some(days) = params.older_than_days {
        if days < 0 {
            return Err(Error::InvalidInput(format!("older_than_days must be >= 0, got {days}")).into());
        }
        let age = chrono::TimeDelta::try_days(days)
            .ok_or_else(|| Error::InvalidInput(format!("older_than_days out of range: {days}")))?;
        deleted_total += cache.purge_favicons_older_than(age).await?;
    }

    if let Some(input) = params.domain {
        let domain = extract_domain(&input).ok_or_else(|| Error::InvalidInput(format!("no domain in {input:?}")))?;
        deleted_total += cache.delete_favicon(&domain).await?;
    }

    if let Some(max_entries) = params.max_entries {
        deleted_total += cache.purge_lru_favicons(max_entries).await?;
    }

    let output = CachePurgeOutput { deleted: deleted_total, remaining: cache.count_favicons().await? };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::output_text;
    use chrono::Utc;
    use icondex_core::FaviconRecord;

    async fn seeded() -> CacheDb {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let now = Utc::now();
        for (domain, age_days) in [("fresh.test", 1), ("month.test", 40), ("ancient.test", 400)] {
            let record = FaviconRecord::checked_at(
                domain,
                format!("https://{domain}/favicon.ico"),
                "32",
                "ico",
                now - chrono::Duration::days(age_days),
            );
            cache.upsert_favicon(&record).await.unwrap();
        }
        cache
    }

    async fn purge(cache: &CacheDb, params: CachePurgeParams) -> CachePurgeOutput {
        let result = purge_impl(cache, params).await.unwrap();
        serde_json::from_str(&output_text(&result)).unwrap()
    }

    #[tokio::test]
    async fn test_purge_by_domain() {
        let cache = seeded().await;
        let params = CachePurgeParams { domain: Some("https://Month.test/x".to_string()), ..Default::default() };

        let output = purge(&cache, params).await;
        assert_eq!(output.deleted, 1);
        assert_eq!(output.remaining, 2);
        assert!(cache.get_favicon("month.test").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_by_age() {
        let cache = seeded().await;
        let params = CachePurgeParams { older_than_days: Some(30), ..Default::default() };

        let output = purge(&cache, params).await;
        assert_eq!(output.deleted, 2);
        assert!(cache.get_favicon("fresh.test").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_purge_lru() {
        let cache = seeded().await;
        let params = CachePurgeParams { max_entries: Some(1), ..Default::default() };

        let output = purge(&cache, params).await;
        assert_eq!(output.deleted, 2);
        assert_eq!(output.remaining, 1);
        assert!(cache.get_favicon("fresh.test").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_purge_no_params() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let result = purge_impl(&cache, CachePurgeParams::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_purge_huge_age_is_rejected() {
        let cache = seeded().await;
        for days in [200_000_000, i64::MAX] {
            let params = CachePurgeParams { older_than_days: Some(days), ..Default::default() };
            let err = purge_impl(&cache, params).await.unwrap_err();
            assert_eq!(err.code.0, -32602);
        }
        assert_eq!(cache.count_favicons().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_purge_negative_age() {
        let cache = seeded().await;
        let params = CachePurgeParams { older_than_days: Some(-1), ..Default::default() };
        assert!(purge_impl(&cache, params).await.is_err());
        assert_eq!(cache.count_favicons().await.unwrap(), 3);
    }
}
