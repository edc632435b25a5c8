//! Asset cache manager.
//!
//! Owns one named bucket and answers the three lifecycle hooks a host
//! dispatches:
//!
//! - `install`: fetch every static resource and store them all in the
//!   current bucket, or fail without writing anything.
//! - `activate`: delete every bucket whose name differs from the current
//!   one, wait for all deletions to settle, then claim open pages.
//! - `fetch`: answer navigations with the cached app shell and everything
//!   else with an exact cache match or an empty 404. Never hits the network.
//!
//! Each hook is an awaited future, which stands in for the host's
//! keep-alive guarantee.

pub mod config;
pub mod fetcher;
pub mod lifecycle;
pub mod request;

use std::sync::{Arc, Mutex, PoisonError};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::{CacheStorage, Error, StoredResponse};

pub use config::WorkerConfig;
pub use fetcher::ResourceFetcher;
pub use lifecycle::{LifecyclePhase, PageControl};
pub use request::{FetchRequest, RequestMode, resolve_url};

/// Outcome of a successful install.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InstallReport {
    /// Bucket that was populated.
    pub cache_name: String,
    /// Stored URLs, in configured order.
    pub urls: Vec<String>,
}

/// A stale bucket that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FailedDeletion {
    pub name: String,
    pub reason: String,
}

/// Outcome of a successful activation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActivationReport {
    /// Bucket kept as current.
    pub cache_name: String,
    /// Stale buckets removed, sorted by name.
    pub deleted: Vec<String>,
    /// Stale buckets whose deletion failed, sorted by name.
    pub failed: Vec<FailedDeletion>,
    /// When open pages were claimed (RFC 3339).
    pub claimed_at: String,
}

/// Cache-first request handler for one worker generation.
pub struct AssetCacheManager {
    config: WorkerConfig,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn ResourceFetcher>,
    pages: Arc<dyn PageControl>,
    phase: Mutex<LifecyclePhase>,
}

impl AssetCacheManager {
    pub fn new(
        config: WorkerConfig, storage: Arc<dyn CacheStorage>, fetcher: Arc<dyn ResourceFetcher>,
        pages: Arc<dyn PageControl>,
    ) -> Self {
        Self { config, storage, fetcher, pages, phase: Mutex::new(LifecyclePhase::Parsed) }
    }

    pub fn cache_name(&self) -> &str {
        &self.config.cache_name
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn phase(&self) -> LifecyclePhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install hook: populate the current bucket with every static resource.
    ///
    /// Fetches run concurrently; storage happens in one step only after all
    /// of them succeeded, and leaves the bucket holding exactly the
    /// configured resources. The install timeout bounds the fetches only:
    /// once the write starts it runs to completion, so `InstallTimeout`
    /// always means nothing was written.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the worker was already installed
    /// - `PopulationFailed` if any resource could not be fetched
    /// - `InstallTimeout` if the fetches did not finish in time
    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.advance(LifecyclePhase::Parsed, LifecyclePhase::Installing)?;
        tracing::info!(cache = %self.config.cache_name, resources = self.config.static_resources.len(), "installing");

        match self.populate().await {
            Ok(report) => {
                self.settle(LifecyclePhase::Installed);
                tracing::info!(cache = %report.cache_name, stored = report.urls.len(), "installed");
                Ok(report)
            }
            Err(e) => {
                self.settle(LifecyclePhase::Redundant);
                tracing::error!(cache = %self.config.cache_name, error = %e, "install failed");
                Err(e)
            }
        }
    }

    async fn populate(&self) -> Result<InstallReport, Error> {
        let cache_name = self.config.cache_name.clone();
        let urls = self.config.resource_urls()?;

        self.storage.open(&cache_name).await?;

        let deadline = self.config.install_timeout;
        let entries = tokio::time::timeout(deadline, self.fetch_all(&urls))
            .await
            .map_err(|_| {
                Error::InstallTimeout(format!("{cache_name} not populated within {}ms", deadline.as_millis()))
            })??;

        let stored = self.storage.replace_all(&cache_name, entries).await?;
        tracing::debug!(cache = %cache_name, stored, "stored resources");

        Ok(InstallReport { cache_name, urls })
    }

    /// Fetch every URL, returning responses in the order given.
    async fn fetch_all(&self, urls: &[String]) -> Result<Vec<StoredResponse>, Error> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut join_set = JoinSet::new();

        for (index, url) in urls.iter().cloned().enumerate() {
            let semaphore = semaphore.clone();
            let fetcher = self.fetcher.clone();
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = fetcher.fetch(&url).await;
                (index, url, result)
            });
        }

        let mut fetched: Vec<Option<StoredResponse>> = vec![None; urls.len()];

        while let Some(joined) = join_set.join_next().await {
            let (index, url, result) = joined.map_err(|e| Error::PopulationFailed {
                url: self.config.cache_name.clone(),
                reason: format!("fetch task failed: {e}"),
            })?;

            let failure = match result {
                Ok(response) if (200..300).contains(&response.status) => {
                    tracing::debug!(%url, status = response.status, bytes = response.body.len(), "fetched resource");
                    fetched[index] = Some(StoredResponse { url, stored_at: None, ..response });
                    continue;
                }
                Ok(response) => Error::PopulationFailed { url, reason: format!("status {}", response.status) },
                Err(e) => Error::PopulationFailed { url, reason: e.to_string() },
            };

            join_set.shutdown().await;
            return Err(failure);
        }

        Ok(fetched.into_iter().flatten().collect())
    }

    /// Activate hook: prune stale buckets, then claim open pages.
    ///
    /// Deletions run concurrently and settle independently; a failed
    /// deletion is reported but does not stop the others or the claim.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the worker is not installed
    /// - storage errors while listing buckets
    /// - `ClaimFailed` (or whatever the host returns) if claiming fails
    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        self.advance(LifecyclePhase::Installed, LifecyclePhase::Activating)?;
        tracing::info!(cache = %self.config.cache_name, "activating");

        match self.prune_and_claim().await {
            Ok(report) => {
                self.settle(LifecyclePhase::Activated);
                tracing::info!(
                    cache = %report.cache_name,
                    deleted = report.deleted.len(),
                    failed = report.failed.len(),
                    "activated"
                );
                Ok(report)
            }
            Err(e) => {
                self.settle(LifecyclePhase::Redundant);
                tracing::error!(cache = %self.config.cache_name, error = %e, "activation failed");
                Err(e)
            }
        }
    }

    async fn prune_and_claim(&self) -> Result<ActivationReport, Error> {
        let cache_name = self.config.cache_name.clone();
        let names = self.storage.keys().await?;

        let mut join_set = JoinSet::new();
        for name in names.into_iter().filter(|name| *name != cache_name) {
            let storage = self.storage.clone();
            join_set.spawn(async move {
                let result = storage.delete(&name).await;
                (name, result)
            });
        }

        let mut deleted = Vec::new();
        let mut failed = Vec::new();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((name, Ok(_))) => {
                    tracing::debug!(bucket = %name, "deleted stale bucket");
                    deleted.push(name);
                }
                Ok((name, Err(e))) => {
                    tracing::warn!(bucket = %name, error = %e, "failed to delete stale bucket");
                    failed.push(FailedDeletion { name, reason: e.to_string() });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "bucket deletion task failed");
                    failed.push(FailedDeletion { name: "unknown".into(), reason: e.to_string() });
                }
            }
        }

        deleted.sort();
        failed.sort_by(|a, b| a.name.cmp(&b.name));

        self.pages.claim().await?;
        let claimed_at = chrono::Utc::now().to_rfc3339();

        Ok(ActivationReport { cache_name, deleted, failed, claimed_at })
    }

    /// Fetch hook: answer a request from the current bucket only.
    ///
    /// Navigations get the entry for `/`. Misses (including an uncached
    /// shell) produce [`StoredResponse::not_found`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` for unparseable request URLs and storage errors
    /// from the lookup. A miss is not an error.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse, Error> {
        let key = if request.is_navigation() {
            self.config.shell_url()?
        } else {
            resolve_url(&self.config.origin, &request.url)?.into()
        };

        match self.storage.match_url(&self.config.cache_name, &key).await? {
            Some(response) => {
                tracing::debug!(url = %request.url, mode = %request.mode, %key, "cache hit");
                Ok(response)
            }
            None => {
                tracing::debug!(url = %request.url, mode = %request.mode, %key, "cache miss");
                Ok(StoredResponse::not_found(key))
            }
        }
    }

    /// URLs stored in the current bucket.
    pub async fn cached_urls(&self) -> Result<Vec<String>, Error> {
        self.storage.entry_urls(&self.config.cache_name).await
    }

    fn advance(&self, from: LifecyclePhase, to: LifecyclePhase) -> Result<(), Error> {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if *phase != from {
            return Err(Error::InvalidState(format!("cannot enter {to} while {}", *phase)));
        }
        *phase = to;
        Ok(())
    }

    fn settle(&self, to: LifecyclePhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}
