//! Core types and shared functionality for shellcache.
//!
//! This crate provides:
//! - The asset cache manager and its lifecycle hooks
//! - Bucket storage with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod worker;

pub use cache::{CacheDb, CacheStorage, StoredResponse};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use worker::{
    ActivationReport, AssetCacheManager, FailedDeletion, FetchRequest, InstallReport, LifecyclePhase, PageControl,
    RequestMode, ResourceFetcher, WorkerConfig,
};
