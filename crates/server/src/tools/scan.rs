//! favicon_scan tool implementation.

use icondex_client::{FaviconService, IconCandidate};
use icondex_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input parameters for the favicon_scan tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FaviconScanParams {
    /// Page URL to scan. A missing scheme defaults to https.
    pub url: String,
}

/// A single discovered icon.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScanCandidate {
    pub url: String,
    pub size: String,
    /// One of "apple-touch-icon", "icon", "manifest" or "probed".
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<IconCandidate> for ScanCandidate {
    fn from(candidate: IconCandidate) -> Self {
        Self { url: candidate.url, size: candidate.size, kind: candidate.kind.as_str().to_string() }
    }
}

/// Output structure for the favicon_scan tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FaviconScanOutput {
    pub url: String,
    pub count: usize,
    /// Candidates in discovery order: declared links, manifest icons, probed paths.
    pub candidates: Vec<ScanCandidate>,
}

/// Implementation of the favicon_scan tool.
pub async fn scan_impl(service: &FaviconService, params: FaviconScanParams) -> Result<CallToolResult, McpError> {
    let candidates: Vec<ScanCandidate> = service
        .scan_site(&params.url)
        .await
        .into_iter()
        .map(ScanCandidate::from)
        .collect();

    let output = FaviconScanOutput { url: params.url, count: candidates.len(), candidates };
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
