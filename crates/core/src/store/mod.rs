//! Durable cache and uncached-candidate store.
//!
//! Keyed storage of previously computed candidate sets (by fingerprint) and
//! of uncached candidates pending later availability. Persistence is
//! best-effort: read and write failures degrade to "no cache hit" /
//! "skipped write" and never fail an aggregation.

mod sqlite;
mod types;
mod uncached;

pub use sqlite::SqliteStore;
pub use types::*;
pub use uncached::merge_uncached;

/// Trait for the durable aggregation store.
pub trait TorrentStore: Send + Sync {
    /// Fetch the cache entry for a fingerprint, if any. TTL enforcement is
    /// the caller's concern.
    fn get_cache(&self, key: &[u8]) -> Result<Option<CacheEntry>, StoreError>;

    /// Replace the cache entry for a fingerprint with a freshly serialized
    /// candidate set.
    fn put_cache(&self, key: &[u8], results: &str) -> Result<(), StoreError>;

    /// Batch-upsert uncached records in a single transaction. Re-insertion
    /// with the same (hash, cache key, torrent id) overwrites prior data.
    fn upsert_uncached(&self, records: &[UncachedRecord]) -> Result<(), StoreError>;
}
