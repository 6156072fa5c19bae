// =============================================================================
// Result Cache - TTL Memoization for Upstream Fetches
// =============================================================================
//
// Keyed by (operation, parameters) flattened into a string. Entries are
// replaced wholesale; a failed fetch stores nothing, so the next call simply
// retries. Eviction is lazy: an expired entry is dropped the next time it is
// looked up. There is no single-flight coordination: two concurrent misses
// may both fetch, and the last insert wins.
// =============================================================================

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::debug;

/// TTL for live price snapshots (CoinGecko).
pub const PRICE_TTL: Duration = Duration::from_secs(60);

/// TTL for historical OHLC series (Kraken).
pub const HISTORY_TTL: Duration = Duration::from_secs(300);

struct CacheEntry<T> {
    value: T,
    fetched_at: Instant,
}

/// One named TTL cache. The service holds two instances, prices and history,
/// so the two refresh policies never interfere.
pub struct ResultCache<T> {
    name: &'static str,
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
}

impl<T: Clone> ResultCache<T> {
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up `key`, dropping the entry if its TTL has elapsed.
    pub fn get(&self, key: &str) -> Option<T> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.fetched_at.elapsed() <= self.ttl => {
                    return Some(entry.value.clone());
                }
                Some(_) => {} // expired, fall through and evict
                None => return None,
            }
        }

        // Re-check under the write lock: a concurrent insert may have
        // refreshed the entry between the two lock acquisitions.
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get(key) {
            if entry.fetched_at.elapsed() <= self.ttl {
                return Some(entry.value.clone());
            }
            entries.remove(key);
        }
        None
    }

    /// Store `value` under `key`, replacing any previous entry wholesale.
    pub fn insert(&self, key: &str, value: T) {
        let mut entries = self.entries.write();
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Return the cached value for `key`, or run `fetch` and cache its
    /// success. Failures are never cached. The fetch runs outside any lock,
    /// so concurrent misses for the same key fetch in parallel.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get(key) {
            debug!(cache = self.name, key, "cache hit");
            return Ok(hit);
        }

        debug!(cache = self.name, key, "cache miss, fetching");
        let value = fetch().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Number of live (unexpired) entries, for the state snapshot.
    pub fn len(&self) -> usize {
        let entries = self.entries.read();
        entries
            .values()
            .filter(|e| e.fetched_at.elapsed() <= self.ttl)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert an entry whose clock is already `age` in the past, so expiry
    /// paths can be tested without sleeping.
    #[cfg(test)]
    fn insert_with_age(&self, key: &str, value: T, age: Duration) {
        let mut entries = self.entries.write();
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                fetched_at: Instant::now() - age,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn cache() -> ResultCache<u64> {
        ResultCache::new("test", Duration::from_secs(60))
    }

    #[tokio::test]
    async fn second_call_within_ttl_skips_fetch() {
        let cache = cache();
        let calls = AtomicU32::new(0);

        for _ in 0..3 {
            let got: Result<u64, String> = cache
                .get_or_fetch("ohlc:XBTUSD:1440:30", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await;
            assert_eq!(got, Ok(42));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_keys_fetch_independently() {
        let cache = cache();
        let calls = AtomicU32::new(0);

        for key in ["ohlc:XBTUSD:1440:7", "ohlc:XBTUSD:1440:30"] {
            let got: Result<u64, String> = cache
                .get_or_fetch(key, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(1)
                })
                .await;
            assert_eq!(got, Ok(1));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_entry_triggers_one_new_fetch() {
        let cache = cache();
        cache.insert_with_age("k", 1, Duration::from_secs(61));

        let calls = AtomicU32::new(0);
        let got: Result<u64, String> = cache
            .get_or_fetch("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(2)
            })
            .await;

        assert_eq!(got, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // The fresh value replaced the stale one.
        assert_eq!(cache.get("k"), Some(2));
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let cache = cache();
        let calls = AtomicU32::new(0);

        let got: Result<u64, String> = cache
            .get_or_fetch("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("boom".to_string())
            })
            .await;
        assert_eq!(got, Err("boom".to_string()));
        assert!(cache.get("k").is_none());

        // The next call retries instead of replaying the failure.
        let got: Result<u64, String> = cache
            .get_or_fetch("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            })
            .await;
        assert_eq!(got, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn get_evicts_expired_entries_lazily() {
        let cache = cache();
        cache.insert_with_age("stale", 1, Duration::from_secs(120));

        assert_eq!(cache.get("stale"), None);
        // The lookup itself removed the entry.
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_replaces_wholesale() {
        let cache = cache();
        cache.insert("k", 1);
        cache.insert("k", 2);
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn len_ignores_expired_entries() {
        let cache = cache();
        cache.insert("fresh", 1);
        cache.insert_with_age("stale", 2, Duration::from_secs(120));
        assert_eq!(cache.len(), 1);
    }
}
