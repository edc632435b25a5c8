//! sw_fetch tool implementation.
//!
//! Runs a request through the fetch hook. Cache-only: nothing here touches
//! the network.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::{AssetCacheManager, Error, FetchRequest, RequestMode};

use super::json_result;

/// Parameters for the sw_fetch tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Request URL, absolute or relative to the app origin.
    pub url: String,
    /// One of navigate, same-origin (default), no-cors, cors.
    #[serde(default)]
    pub mode: Option<String>,
    /// Request method (default GET). Not used for matching.
    #[serde(default)]
    pub method: Option<String>,
}

impl SwFetchParams {
    pub fn into_request(self) -> Result<FetchRequest, Error> {
        let mode = match self.mode.as_deref() {
            Some(mode) => mode.parse::<RequestMode>()?,
            None => RequestMode::default(),
        };

        let mut request = FetchRequest::get(self.url).with_mode(mode);
        if let Some(method) = self.method {
            request.method = method.to_ascii_uppercase();
        }
        Ok(request)
    }
}

/// Output from the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    /// Cache key the request resolved to.
    pub url: String,
    /// HTTP status of the answer (404 on a miss).
    pub status: u16,
    /// Stored response headers.
    pub headers: Vec<(String, String)>,
    /// Body as text, when it is valid UTF-8.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,
    /// Body length in bytes.
    pub body_bytes: usize,
    /// Whether the answer came from the bucket.
    pub from_cache: bool,
    /// When the entry was stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_at: Option<String>,
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(manager: &AssetCacheManager, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    let request = params.into_request()?;
    let response = manager.fetch(&request).await?;

    let output = SwFetchOutput {
        from_cache: response.is_cached(),
        body_bytes: response.body.len(),
        body_text: String::from_utf8(response.body).ok(),
        url: response.url,
        status: response.status,
        headers: response.headers,
        stored_at: response.stored_at,
    };

    json_result(&output)
}
