//! Injected settings for one worker generation.

use std::time::Duration;

use url::Url;

use super::request::resolve_url;
use crate::Error;

/// Settings the asset cache manager is constructed with.
///
/// Usually derived from [`crate::AppConfig::worker_config`]; tests build
/// them directly to exercise several versions side by side.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Name of the current bucket, e.g. `period-tracker-v1`.
    pub cache_name: String,
    /// Origin the static resources are served from.
    pub origin: Url,
    /// Root-relative paths stored at install time.
    pub static_resources: Vec<String>,
    /// Deadline for fetching the static resources during install.
    pub install_timeout: Duration,
    /// Maximum resources fetched at once during install.
    pub max_concurrency: usize,
}

impl WorkerConfig {
    pub fn new(cache_name: impl Into<String>, origin: Url, static_resources: Vec<String>) -> Self {
        Self {
            cache_name: cache_name.into(),
            origin,
            static_resources,
            install_timeout: Duration::from_secs(60),
            max_concurrency: 4,
        }
    }

    pub fn with_install_timeout(mut self, timeout: Duration) -> Self {
        self.install_timeout = timeout;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Absolute URLs of the static resources, in configured order.
    ///
    /// Every resource must resolve to the configured origin; a
    /// protocol-relative path such as `//cdn.example/x` is rejected.
    pub fn resource_urls(&self) -> Result<Vec<String>, Error> {
        self.static_resources
            .iter()
            .map(|path| {
                let url = resolve_url(&self.origin, path)?;
                if url.origin() != self.origin.origin() {
                    return Err(Error::InvalidUrl(format!("{path} resolves outside {}", self.origin)));
                }
                Ok(url.into())
            })
            .collect()
    }

    /// Key of the app shell every navigation is answered with.
    pub fn shell_url(&self) -> Result<String, Error> {
        resolve_url(&self.origin, "/").map(String::from)
    }
}
