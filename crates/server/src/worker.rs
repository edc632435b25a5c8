//! The worker generation the tools drive.
//!
//! A manager moves through its lifecycle once. When an install or activation
//! fails it ends up redundant, and the next `sw_install` swaps in a fresh
//! manager built by the factory instead of being rejected.

use std::sync::Arc;

use shellcache_core::{AssetCacheManager, LifecyclePhase};
use tokio::sync::RwLock;

type ManagerFactory = Box<dyn Fn() -> AssetCacheManager + Send + Sync>;

/// Holds the current manager and knows how to build its replacement.
pub struct WorkerSlot {
    current: RwLock<Arc<AssetCacheManager>>,
    factory: ManagerFactory,
}

impl WorkerSlot {
    pub fn new(factory: impl Fn() -> AssetCacheManager + Send + Sync + 'static) -> Self {
        let manager = Arc::new(factory());
        Self { current: RwLock::new(manager), factory: Box::new(factory) }
    }

    /// The manager currently answering hooks.
    pub async fn current(&self) -> Arc<AssetCacheManager> {
        self.current.read().await.clone()
    }

    /// The manager an install should run on.
    ///
    /// A redundant manager is replaced first; any other phase is handed back
    /// as is and the manager itself decides whether installing is allowed.
    pub async fn for_install(&self) -> Arc<AssetCacheManager> {
        let mut current = self.current.write().await;
        if current.phase() == LifecyclePhase::Redundant {
            tracing::info!(cache = %current.cache_name(), "replacing redundant worker");
            *current = Arc::new((self.factory)());
        }
        current.clone()
    }
}
