//! In-memory memoization of facade results.
//!
//! Each memoized operation owns one [`MemoCache`] keyed by a structured tuple
//! of its normalized arguments. The cache is explicitly unbounded: entries
//! live until [`MemoCache::clear`] is called, which the client does when the
//! language changes.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use tokio::sync::Mutex;
use tracing::debug;

/// Unbounded memo table for one operation
///
/// Safe to share between concurrent callers. The lock is not held while a
/// missing value is computed, so two callers racing on the same key may both
/// compute it; the last one to finish wins.
pub struct MemoCache<K, V> {
    /// Operation name, used in log fields
    name: &'static str,
    /// Whether memoization is enabled
    enabled: bool,
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Debug,
    V: Clone,
{
    /// Create a new cache; a disabled cache never stores anything
    pub fn new(name: &'static str, enabled: bool) -> Self {
        Self {
            name,
            enabled,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get a memoized value if it exists
    pub async fn get(&self, key: &K) -> Option<V> {
        if !self.enabled {
            return None;
        }

        let value = self.entries.lock().await.get(key).cloned();
        match value {
            Some(_) => debug!(cache = self.name, key = ?key, "Cache hit"),
            None => debug!(cache = self.name, key = ?key, "Cache miss"),
        }
        value
    }

    /// Store a value
    pub async fn insert(&self, key: K, value: V) {
        if self.enabled {
            self.entries.lock().await.insert(key, value);
        }
    }

    /// Return the memoized value for `key`, computing and storing it on a miss
    ///
    /// Errors from `compute` are returned as-is and never stored.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }

        let value = compute().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Drop every entry
    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        let dropped = entries.len();
        entries.clear();
        debug!(cache = self.name, dropped = dropped, "Cache cleared");
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Key {
        query: String,
        results: u32,
    }

    fn key(query: &str, results: u32) -> Key {
        Key {
            query: query.to_string(),
            results,
        }
    }

    #[tokio::test]
    async fn test_hit_skips_computation() {
        let cache: MemoCache<Key, Vec<String>> = MemoCache::new("search", true);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_try_insert_with(key("Barack", 10), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(vec!["Barack Obama".to_string()])
                })
                .await
                .unwrap();
            assert_eq!(value, ["Barack Obama"]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_arguments_are_part_of_the_key() {
        let cache: MemoCache<Key, u32> = MemoCache::new("search", true);

        cache.insert(key("Barack", 10), 1).await;

        assert_eq!(cache.get(&key("Barack", 10)).await, Some(1));
        assert_eq!(cache.get(&key("Barack", 1)).await, None);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: MemoCache<Key, u32> = MemoCache::new("summary", true);
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_try_insert_with(key("Purpleberry", 0), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>("not found")
            })
            .await;
        assert!(first.is_err());

        let second = cache
            .get_or_try_insert_with(key("Purpleberry", 0), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, &str>(7)
            })
            .await;
        assert_eq!(second, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clear_empties_cache() {
        let cache: MemoCache<Key, u32> = MemoCache::new("suggest", true);
        cache.insert(key("a", 1), 1).await;
        cache.insert(key("b", 1), 2).await;
        assert_eq!(cache.len().await, 2);

        cache.clear().await;
        assert!(cache.is_empty().await);
        assert_eq!(cache.get(&key("a", 1)).await, None);
    }

    #[tokio::test]
    async fn test_disabled_cache_never_stores() {
        let cache: MemoCache<Key, u32> = MemoCache::new("search", false);
        cache.insert(key("a", 1), 1).await;

        assert!(!cache.is_enabled());
        assert_eq!(cache.get(&key("a", 1)).await, None);
        assert!(cache.is_empty().await);
    }
}
