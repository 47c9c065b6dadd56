//! Types for the durable store.

use thiserror::Error;

/// A cached candidate set, keyed externally by fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Unix seconds at write time; compared against a TTL by the caller.
    pub timestamp: i64,
    /// Serialized candidate set (JSON object keyed by info hash).
    pub results: String,
}

/// One uncached candidate pending later availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncachedRecord {
    /// Info hash, lower-cased.
    pub hash: String,
    /// External-provider torrent id; empty until the debrid collaborator
    /// assigns one.
    pub torrent_id: String,
    /// Serialized candidate payload.
    pub data: String,
    /// Fingerprint of the owning cache entry.
    pub cache_key: Vec<u8>,
    /// Unix seconds at write time.
    pub timestamp: i64,
}

/// Errors from the durable store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}
