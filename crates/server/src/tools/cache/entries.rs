//! cache_entries tool implementation.
//!
//! Lists the URLs stored in a bucket.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::{AssetCacheManager, CacheDb};

use crate::error::ServerError;
use crate::tools::json_result;

/// Parameters for the cache_entries tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheEntriesParams {
    /// Bucket to list. Defaults to the current bucket.
    #[serde(default)]
    pub cache_name: Option<String>,
}

/// Output from the cache_entries tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheEntriesOutput {
    pub cache_name: String,
    /// Whether the bucket exists at all.
    pub exists: bool,
    /// Stored URLs, sorted.
    pub urls: Vec<String>,
}

/// Implementation of the cache_entries tool.
pub async fn entries_impl(
    db: &CacheDb, manager: &AssetCacheManager, params: CacheEntriesParams,
) -> Result<CallToolResult, McpError> {
    let cache_name = match params.cache_name {
        Some(name) if name.trim().is_empty() => {
            return Err(ServerError::InvalidInput("cache_name cannot be empty".into()).into());
        }
        Some(name) => name,
        None => manager.cache_name().to_string(),
    };

    let exists = db.has_bucket(&cache_name).await?;
    let urls = db.entry_urls(&cache_name).await?;

    json_result(&CacheEntriesOutput { cache_name, exists, urls })
}
