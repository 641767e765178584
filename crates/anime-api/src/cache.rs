//! Response cache for catalog endpoints.
//!
//! Time-boxed memoization of upstream JSON keyed by request path and query.
//! Episode sources are never cached.

use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Cached response
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
}

/// Cache manager for API responses
#[derive(Debug)]
pub struct CacheManager {
    /// Entries keyed by request identity
    entries: HashMap<String, CacheEntry>,
    /// How long an entry stays fresh
    ttl: Duration,
    /// Whether caching is enabled
    enabled: bool,
}

impl CacheManager {
    /// Create a new cache manager
    pub fn new(ttl: Duration, enabled: bool) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            enabled: enabled && !ttl.is_zero(),
        }
    }

    /// Get a cached item if it exists and is still fresh
    pub fn get(&mut self, key: &str) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&mut self, key: &str, now: Instant) -> Option<Value> {
        if !self.enabled {
            return None;
        }

        match self.entries.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) < self.ttl => {
                debug!(key = key, "Cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!(key = key, "Cache entry expired");
                self.entries.remove(key);
                None
            }
            None => {
                debug!(key = key, "Cache miss");
                None
            }
        }
    }

    /// Store an item in the cache
    pub fn set(&mut self, key: &str, value: &Value) {
        self.set_at(key, value, Instant::now());
    }

    fn set_at(&mut self, key: &str, value: &Value, now: Instant) {
        if !self.enabled {
            return;
        }

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.clone(),
                stored_at: now,
            },
        );
        debug!(key = key, "Cache stored");
    }

    /// Drop expired entries
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.duration_since(entry.stored_at) < ttl);
        before - self.entries.len()
    }

    /// Clear all cache
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            enabled: self.enabled,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_entries: usize,
    pub enabled: bool,
}
