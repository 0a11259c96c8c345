//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, CachePurgeParams, get_impl, purge_impl};
use crate::tools::resolve::{FaviconResolveParams, resolve_impl};
use crate::tools::scan::{FaviconScanParams, scan_impl};

use icondex_client::FaviconService;
use icondex_core::CacheDb;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for icondex.
#[derive(Clone)]
pub struct IcondexServer {
    tool_router: ToolRouter<Self>,
    service: Arc<FaviconService>,
    cache: CacheDb,
    cache_ttl: chrono::Duration,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl IcondexServer {
    /// Create a new server handler around a shared service and its cache.
    pub fn new(service: Arc<FaviconService>, cache: CacheDb, cache_ttl: chrono::Duration) -> Self {
        Self { tool_router: Self::tool_router(), service, cache, cache_ttl }
    }

    #[tool(
        description = "Resolve the favicon for a URL. Serves the cached icon for the domain when fresh, otherwise tries icon providers in order and falls back to a built-in icon. Never fails."
    )]
    async fn favicon_resolve(&self, params: Parameters<FaviconResolveParams>) -> Result<CallToolResult, McpError> {
        resolve_impl(&self.service, params.0).await
    }

    #[tool(
        description = "Scan a site for every declared icon: <link> tags, web app manifest icons, and conventional paths such as /favicon.ico. Does not use the cache."
    )]
    async fn favicon_scan(&self, params: Parameters<FaviconScanParams>) -> Result<CallToolResult, McpError> {
        scan_impl(&self.service, params.0).await
    }

    #[tool(description = "Get the cached favicon record for a domain or URL.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.cache, self.cache_ttl, params.0).await
    }

    #[tool(description = "Purge cached favicon records by domain, by age in days, or by keeping only the newest N.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.cache, params.0).await
    }
}

impl ServerHandler for IcondexServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "icondex".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Use favicon_resolve for a single best icon per site and favicon_scan to list every icon a site offers."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
