//! Cache inspection tools.
//!
//! Read-only views of the bucket store.

pub mod entries;
pub mod keys;

pub use entries::{CacheEntriesParams, entries_impl};
pub use keys::keys_impl;
