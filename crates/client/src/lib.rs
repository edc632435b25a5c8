//! Client code for shellcache.
//!
//! This crate provides the HTTP fetcher the install hook uses to pull
//! static resources into a bucket.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig};
