//! Time-boxed in-memory cache for reference data.
//!
//! Values are stored as JSON strings under a [`CacheKey`] and deserialized on
//! read. Entries older than the cache's TTL read as misses. Concurrent
//! writers race on population and the last writer wins.

use crate::error::{DataLoadError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Reference lists default to a 30 minute lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Regions,
    Region(String),
    TimeWindows,
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Regions => write!(f, "regions"),
            CacheKey::Region(id) => write!(f, "region:{}", id),
            CacheKey::TimeWindows => write!(f, "time-windows"),
        }
    }
}

struct CacheEntry {
    json: String,
    stored_at: Instant,
}

/// Process-wide cache with a fixed TTL.
pub struct TtlCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    /// Creates an empty cache whose entries live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Retrieves a value by key
    ///
    /// Returns `None` on a miss or when the entry has outlived the TTL.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);

        match entries.get(&key.to_string()) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                let value = serde_json::from_str(&entry.json).map_err(|e| {
                    DataLoadError::ParseError {
                        file: format!("cache:{}", key),
                        reason: e.to_string(),
                    }
                })?;
                Ok(Some(value))
            }
            _ => Ok(None),
        }
    }

    /// Stores a value, replacing any previous entry under the same key
    pub fn set<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Cache serialization error");
                return;
            }
        };

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key.to_string(),
            CacheEntry {
                json,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drops the entry for `key`, if any
    pub fn invalidate(&self, key: &CacheKey) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(&key.to_string());
    }

    /// Drops every entry
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display() {
        assert_eq!(format!("{}", CacheKey::Regions), "regions");
        assert_eq!(format!("{}", CacheKey::TimeWindows), "time-windows");
        assert_eq!(
            format!("{}", CacheKey::Region("seongsu".to_string())),
            "region:seongsu"
        );
    }

    #[test]
    fn test_cache_miss() {
        let cache = TtlCache::default();
        let retrieved: Option<Vec<String>> = cache.get(&CacheKey::Regions).unwrap();
        assert_eq!(retrieved, None);
    }

    #[test]
    fn test_set_then_get() {
        let cache = TtlCache::default();
        let value = vec!["seongsu".to_string(), "hongdae".to_string()];

        cache.set(&CacheKey::Regions, &value);

        let retrieved: Option<Vec<String>> = cache.get(&CacheKey::Regions).unwrap();
        assert_eq!(retrieved, Some(value));
    }

    #[test]
    fn test_expired_entry_reads_as_miss() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.set(&CacheKey::TimeWindows, &vec![1, 2, 3]);

        let retrieved: Option<Vec<u32>> = cache.get(&CacheKey::TimeWindows).unwrap();
        assert_eq!(retrieved, None);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = TtlCache::default();
        cache.set(&CacheKey::Regions, &vec!["a"]);
        cache.set(&CacheKey::TimeWindows, &vec![1]);

        cache.invalidate(&CacheKey::Regions);
        let regions: Option<Vec<String>> = cache.get(&CacheKey::Regions).unwrap();
        assert_eq!(regions, None);
        let windows: Option<Vec<u32>> = cache.get(&CacheKey::TimeWindows).unwrap();
        assert_eq!(windows, Some(vec![1]));

        cache.clear();
        let windows: Option<Vec<u32>> = cache.get(&CacheKey::TimeWindows).unwrap();
        assert_eq!(windows, None);
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let cache = TtlCache::default();
        cache.set(&CacheKey::Regions, &"not a list");

        let result: Result<Option<Vec<u32>>> = cache.get(&CacheKey::Regions);
        assert!(matches!(result, Err(DataLoadError::ParseError { .. })));
    }
}
