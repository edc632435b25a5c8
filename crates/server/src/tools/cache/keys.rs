//! cache_keys tool implementation.
//!
//! Lists every bucket in storage and marks the current one.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::{AssetCacheManager, CacheDb};

use crate::tools::json_result;

/// Output from the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysOutput {
    /// Name of the bucket this worker reads from.
    pub current: String,
    /// All bucket names in creation order.
    pub buckets: Vec<String>,
    /// Buckets that will be deleted on activation.
    pub stale: Vec<String>,
}

/// Implementation of the cache_keys tool.
pub async fn keys_impl(db: &CacheDb, manager: &AssetCacheManager) -> Result<CallToolResult, McpError> {
    let current = manager.cache_name().to_string();
    let buckets = db.bucket_names().await?;
    let stale = buckets.iter().filter(|name| **name != current).cloned().collect();

    json_result(&CacheKeysOutput { current, buckets, stale })
}
