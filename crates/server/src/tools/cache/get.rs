//! cache_get tool implementation.
//!
//! Retrieves the cached favicon record for a domain.

use chrono::Utc;
use icondex_client::extract_domain;
use icondex_core::{CacheDb, Error, FaviconRecord};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// A domain ("example.com") or any URL on it.
    pub domain: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    /// The cached record.
    pub record: FaviconRecord,
    /// Whether the next resolution will re-run the provider waterfall.
    pub stale: bool,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(
    cache: &CacheDb, ttl: chrono::Duration, params: CacheGetParams,
) -> Result<CallToolResult, McpError> {
    let domain = extract_domain(&params.domain)
        .ok_or_else(|| Error::InvalidInput(format!("no domain in {:?}", params.domain)))?;

    let record = cache
        .get_favicon(&domain)
        .await?
        .ok_or_else(|| Error::CacheMiss(domain.clone()))?;

    let stale = record.is_stale(ttl, Utc::now());
    let output = CacheGetOutput { record, stale };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize record: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
