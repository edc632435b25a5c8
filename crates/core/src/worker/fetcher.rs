//! Network capability used to populate a bucket at install time.

use async_trait::async_trait;

use crate::{Error, StoredResponse};

/// Fetches a single resource for storage.
///
/// Implementations should fail on transport errors; the manager rejects
/// non-2xx responses on its own as well.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<StoredResponse, Error>;
}
