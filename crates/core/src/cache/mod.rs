//! SQLite-backed bucket storage for cached responses.
//!
//! This module provides named, persistent buckets keyed by request URL,
//! with async access via tokio-rusqlite. It supports:
//!
//! - Implicit bucket creation on open
//! - All-or-nothing bulk inserts
//! - Exact URL lookup
//! - Bucket enumeration and deletion (entries cascade)
//! - Automatic schema migrations and WAL mode

pub mod buckets;
pub mod connection;
pub mod entries;
pub mod migrations;
pub mod storage;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::StoredResponse;
pub use storage::CacheStorage;
