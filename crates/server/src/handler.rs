//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::pages::PageClaims;
use crate::tools::{
    CacheEntriesParams, SwFetchParams, activate_impl, entries_impl, fetch_impl, install_impl, keys_impl, status_impl,
};
use crate::worker::WorkerSlot;

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
use shellcache_core::CacheDb;

/// The main MCP server handler for shellcache.
#[derive(Clone)]
pub struct ShellCacheServer {
    tool_router: ToolRouter<Self>,
    worker: Arc<WorkerSlot>,
    db: CacheDb,
    pages: Arc<PageClaims>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl ShellCacheServer {
    /// Create a new server handler around a worker slot.
    pub fn new(worker: Arc<WorkerSlot>, db: CacheDb, pages: Arc<PageClaims>) -> Self {
        Self { tool_router: Self::tool_router(), worker, db, pages }
    }

    /// Install hook.
    #[tool(description = "Install the worker: fetch every static resource and store them in the current cache. \
                          Fails without storing anything if any resource is unreachable; \
                          calling it again after a failure retries with a fresh worker.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.worker).await
    }

    /// Activate hook.
    #[tool(description = "Activate the worker: delete every cache not named after the current version, \
                          then claim open pages. Requires a completed install.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&*self.worker.current().await).await
    }

    /// Fetch hook.
    #[tool(description = "Answer a request from the cache. Navigations (mode=navigate) get the cached '/' page; \
                          other requests get the exact cached entry or an empty 404.")]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&*self.worker.current().await, params.0).await
    }

    #[tool(description = "Report the worker's cache name, lifecycle phase, entry count and claim time.")]
    async fn sw_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&*self.worker.current().await, &self.pages).await
    }

    #[tool(description = "List every cache bucket in storage and which ones are stale.")]
    async fn cache_keys(&self) -> Result<CallToolResult, McpError> {
        keys_impl(&self.db, &*self.worker.current().await).await
    }

    #[tool(description = "List the URLs stored in a cache bucket (default: the current one).")]
    async fn cache_entries(&self, params: Parameters<CacheEntriesParams>) -> Result<CallToolResult, McpError> {
        entries_impl(&self.db, &*self.worker.current().await, params.0).await
    }
}

impl ServerHandler for ShellCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "shellcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
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
