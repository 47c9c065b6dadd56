//! SQLite-backed aggregation store.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{CacheEntry, StoreError, TorrentStore, UncachedRecord};

/// SQLite-backed store behind a connection mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Database(e.to_string()))?;
            }
        }
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            -- One cached candidate set per fingerprint
            CREATE TABLE IF NOT EXISTS cache (
                cacheKey BLOB PRIMARY KEY,
                timestamp INTEGER NOT NULL,
                results TEXT NOT NULL
            );

            -- Uncached candidates pending later availability
            CREATE TABLE IF NOT EXISTS uncached_torrents (
                hash TEXT NOT NULL,
                torrentId TEXT NOT NULL DEFAULT '',
                data TEXT NOT NULL,
                cacheKey BLOB NOT NULL,
                timestamp INTEGER NOT NULL,
                PRIMARY KEY (hash, cacheKey, torrentId)
            );

            -- Resolved stream links, owned by the debrid collaborator; the
            -- schema lives here so both share one database file.
            CREATE TABLE IF NOT EXISTS download_links (
                debridKey TEXT NOT NULL,
                hash TEXT NOT NULL,
                `index` TEXT NOT NULL,
                link TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                PRIMARY KEY (debridKey, hash, `index`)
            );
            "#,
        )?;

        Ok(())
    }
}

impl TorrentStore for SqliteStore {
    fn get_cache(&self, key: &[u8]) -> Result<Option<CacheEntry>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let entry = conn
            .query_row(
                "SELECT timestamp, results FROM cache WHERE cacheKey = ?",
                params![key],
                |row| {
                    Ok(CacheEntry {
                        timestamp: row.get(0)?,
                        results: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    fn put_cache(&self, key: &[u8], results: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO cache (cacheKey, timestamp, results) VALUES (?, ?, ?)",
            params![key, Utc::now().timestamp(), results],
        )?;
        Ok(())
    }

    fn upsert_uncached(&self, records: &[UncachedRecord]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO uncached_torrents (hash, torrentId, data, cacheKey, timestamp)
                 VALUES (?, ?, ?, ?, ?)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.hash,
                    record.torrent_id,
                    record.data,
                    record.cache_key,
                    record.timestamp,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
impl SqliteStore {
    /// Dump (hash, data) rows for assertions.
    pub(crate) fn dump_uncached(&self) -> Vec<(String, String)> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT hash, data FROM uncached_torrents ORDER BY hash")
            .unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap();
        rows.map(|r| r.unwrap()).collect()
    }
}
