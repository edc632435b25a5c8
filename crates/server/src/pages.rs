//! Page control for the stdio host.
//!
//! There are no browser tabs behind this host, so a claim is recorded and
//! reported through `sw_status`.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shellcache_core::{Error, PageControl};

#[derive(Debug, Default)]
pub struct PageClaims {
    claimed_at: Mutex<Option<DateTime<Utc>>>,
}

impl PageClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// When the worker last claimed open pages.
    pub fn claimed_at(&self) -> Option<DateTime<Utc>> {
        self.claimed_at.lock().ok().and_then(|guard| *guard)
    }
}

#[async_trait]
impl PageControl for PageClaims {
    async fn claim(&self) -> Result<(), Error> {
        let mut claimed_at = self
            .claimed_at
            .lock()
            .map_err(|_| Error::ClaimFailed("claim state poisoned".into()))?;
        *claimed_at = Some(Utc::now());
        tracing::info!("claimed open pages");
        Ok(())
    }
}
