//! Annotation response caching.
//!
//! The nomenclature-keyed annotation service is memoized through an
//! explicit cache collaborator handed to the client, rather than a cache
//! hidden inside it. Two implementations are provided: an in-memory map
//! for tests and one-shot runs, and a SQLite-backed store that persists
//! across runs. Neither evicts; the cache grows without bound by design.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::Result;

/// Statistics for cache usage.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
}

impl CacheStats {
    /// Hit rate as a percentage.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Key -> JSON payload cache for annotation responses.
pub trait AnnotationCache {
    /// Fetch the cached payload for a key, if any.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store a payload under a key, replacing any previous entry.
    fn put(&self, key: &str, payload: &Value) -> Result<()>;
}

/// In-memory cache. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Value>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryCache {
    /// Create an empty in-memory cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached payloads.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hit/miss counters since construction.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl AnnotationCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().unwrap();
        match entries.get(key) {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn put(&self, key: &str, payload: &Value) -> Result<()> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), payload.clone());
        Ok(())
    }
}

/// SQLite-backed cache that survives across runs.
pub struct PersistentCache {
    conn: Connection,
}

impl PersistentCache {
    /// Open (or create) a cache database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// In-memory SQLite cache, for tests of the persistent code path.
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS annotation_cache (
                 key     TEXT PRIMARY KEY,
                 payload TEXT NOT NULL
             );",
        )?;
        Ok(Self { conn })
    }

    /// Number of cached payloads.
    pub fn len(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM annotation_cache", [], |row| {
                    row.get(0)
                })?;
        Ok(count as usize)
    }
}

impl AnnotationCache for PersistentCache {
    fn get(&self, key: &str) -> Option<Value> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM annotation_cache WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .ok()
            .flatten();
        payload.and_then(|p| serde_json::from_str(&p).ok())
    }

    fn put(&self, key: &str, payload: &Value) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO annotation_cache (key, payload) VALUES (?1, ?2)",
            params![key, serde_json::to_string(payload)?],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_cache_round_trip() {
        let cache = MemoryCache::new();
        assert!(cache.get("chr1:g.1000A>G").is_none());

        cache
            .put("chr1:g.1000A>G", &json!({"clinvar": {"rcv": []}}))
            .unwrap();
        let value = cache.get("chr1:g.1000A>G").unwrap();
        assert_eq!(value["clinvar"]["rcv"], json!([]));
    }

    #[test]
    fn test_memory_cache_replace() {
        let cache = MemoryCache::new();
        cache.put("k", &json!(1)).unwrap();
        cache.put("k", &json!(2)).unwrap();
        assert_eq!(cache.get("k").unwrap(), json!(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_memory_cache_stats() {
        let cache = MemoryCache::new();
        cache.put("k", &json!(1)).unwrap();
        cache.get("k");
        cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_stats_zero_total() {
        assert!((CacheStats::default().hit_rate() - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_persistent_cache_round_trip() {
        let cache = PersistentCache::in_memory().unwrap();
        assert!(cache.get("k").is_none());

        cache.put("k", &json!({"dbsnp": {"rsid": "rs1"}})).unwrap();
        assert_eq!(cache.get("k").unwrap()["dbsnp"]["rsid"], "rs1");
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_persistent_cache_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotations.db");

        {
            let cache = PersistentCache::open(&path).unwrap();
            cache.put("chr1:g.1000A>G", &json!({"hit": true})).unwrap();
        }

        let cache = PersistentCache::open(&path).unwrap();
        assert_eq!(cache.get("chr1:g.1000A>G").unwrap()["hit"], json!(true));
    }
}
