use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use xxhash_rust::xxh3::xxh3_64;

/// Stable 64-bit key for a rendered alert message.
///
/// Identical text yields the same fingerprint within and across process
/// restarts (no process-local salt). A collision only ever causes a rare
/// false suppression, never a corrupted delivery.
pub fn fingerprint(text: &str) -> u64 {
    xxh3_64(text.as_bytes())
}

/// Keyed presence store with per-key expiry, backing the cooldown gate.
///
/// Implementations must be safe for concurrent use. The alerter inserts
/// only after a confirmed delivery, so a backend that loses entries (for
/// example an LRU under memory pressure) degrades to duplicate alerts,
/// never to dropped ones.
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// True iff an unexpired entry exists for `key`.
    async fn contains(&self, key: &str) -> bool;

    /// Insert or refresh `key` with the given time-to-live.
    async fn insert(&self, key: &str, ttl: Duration);
}

/// In-memory [`DedupStore`] used when no backend override is configured.
///
/// Expired entries are dropped lazily on lookup and on insert.
#[derive(Default)]
pub struct MemoryDedupStore {
    entries: Mutex<HashMap<String, Instant>>,
}

impl MemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DedupStore for MemoryDedupStore {
    async fn contains(&self, key: &str) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(expires_at) if *expires_at > Instant::now() => true,
            Some(_) => {
                entries.remove(key);
                false
            }
            None => false,
        }
    }

    async fn insert(&self, key: &str, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        entries.retain(|_, expires_at| *expires_at > now);
        entries.insert(key.to_string(), now + ttl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let first = fingerprint("disk usage at 95%");
        let second = fingerprint("disk usage at 95%");
        assert_eq!(first, second);
    }

    #[test]
    fn test_distinct_texts_do_not_collide() {
        let messages = [
            "disk usage at 95%",
            "disk usage at 96%",
            "connection pool exhausted",
            "replica lag above threshold",
            "tls certificate expires in 3 days",
            "",
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(fingerprint(a), fingerprint(b), "{a:?} vs {b:?}");
            }
        }
    }

    #[tokio::test]
    async fn test_entry_present_until_ttl_expires() {
        let store = MemoryDedupStore::new();
        store.insert("12345", Duration::from_millis(50)).await;

        assert!(store.contains("12345").await);
        sleep(Duration::from_millis(80)).await;
        assert!(!store.contains("12345").await);
    }

    #[tokio::test]
    async fn test_missing_key_is_absent() {
        let store = MemoryDedupStore::new();
        assert!(!store.contains("12345").await);
    }

    #[tokio::test]
    async fn test_insert_refreshes_expiry() {
        let store = MemoryDedupStore::new();
        store.insert("12345", Duration::from_millis(60)).await;
        sleep(Duration::from_millis(40)).await;

        store.insert("12345", Duration::from_millis(60)).await;
        sleep(Duration::from_millis(40)).await;

        // still inside the refreshed window
        assert!(store.contains("12345").await);
    }

    #[tokio::test]
    async fn test_expired_entries_are_purged_on_insert() {
        let store = MemoryDedupStore::new();
        store.insert("old", Duration::from_millis(10)).await;
        sleep(Duration::from_millis(30)).await;

        store.insert("new", Duration::from_secs(60)).await;
        assert_eq!(store.entries.lock().len(), 1);
    }
}
