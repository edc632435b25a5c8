//! Storage capability consumed by the asset cache manager.

use async_trait::async_trait;

use super::{CacheDb, StoredResponse};
use crate::Error;

/// Named-bucket key-value store.
///
/// Mirrors the operations a browser's `CacheStorage` offers: open-by-name,
/// bulk insert, exact-match lookup, enumeration and deletion.
/// All operations may fail.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a bucket, creating it if absent.
    async fn open(&self, name: &str) -> Result<(), Error>;

    /// All bucket names currently in storage.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Delete a bucket. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    /// Make the bucket hold exactly these responses, in one step; either all
    /// land (and every other entry is gone) or nothing changes.
    async fn replace_all(&self, name: &str, entries: Vec<StoredResponse>) -> Result<usize, Error>;

    /// Exact lookup by URL.
    async fn match_url(&self, name: &str, url: &str) -> Result<Option<StoredResponse>, Error>;

    /// URLs currently stored in a bucket.
    async fn entry_urls(&self, name: &str) -> Result<Vec<String>, Error>;
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.open_bucket(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.bucket_names().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        self.delete_bucket(name).await
    }

    async fn replace_all(&self, name: &str, entries: Vec<StoredResponse>) -> Result<usize, Error> {
        self.replace_entries(name, entries).await
    }

    async fn match_url(&self, name: &str, url: &str) -> Result<Option<StoredResponse>, Error> {
        self.match_entry(name, url).await
    }

    async fn entry_urls(&self, name: &str) -> Result<Vec<String>, Error> {
        CacheDb::entry_urls(self, name).await
    }
}
