//! sw_install, sw_activate and sw_status tool implementations.
//!
//! The host calls install, then activate; each call returns once the hook
//! has settled. A failed install can be retried: the next call runs on a
//! fresh worker.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::{AssetCacheManager, LifecyclePhase};

use super::json_result;
use crate::pages::PageClaims;
use crate::worker::WorkerSlot;

/// Output from the sw_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwStatusOutput {
    /// Current bucket name.
    pub cache_name: String,
    /// Lifecycle phase of this worker.
    pub phase: LifecyclePhase,
    /// Number of entries in the current bucket.
    pub cached_entries: usize,
    /// When open pages were claimed, if they were.
    pub claimed_at: Option<String>,
}

/// Implementation of the sw_install tool.
pub async fn install_impl(worker: &WorkerSlot) -> Result<CallToolResult, McpError> {
    let report = worker.for_install().await.install().await?;
    json_result(&report)
}

/// Implementation of the sw_activate tool.
pub async fn activate_impl(manager: &AssetCacheManager) -> Result<CallToolResult, McpError> {
    let report = manager.activate().await?;
    json_result(&report)
}

/// Implementation of the sw_status tool.
pub async fn status_impl(manager: &AssetCacheManager, pages: &PageClaims) -> Result<CallToolResult, McpError> {
    let output = SwStatusOutput {
        cache_name: manager.cache_name().to_string(),
        phase: manager.phase(),
        cached_entries: manager.cached_urls().await?.len(),
        claimed_at: pages.claimed_at().map(|t| t.to_rfc3339()),
    };
    json_result(&output)
}
