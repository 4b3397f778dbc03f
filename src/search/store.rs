//! TTL store for successful upstream search payloads.
//!
//! Expiry is lazy: an old entry is ignored on read and replaced by the next
//! successful write for its key. There is no capacity bound.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::kicks::SearchPayload;

#[derive(Clone)]
pub struct ResponseStore {
    /// normalized key → (stored_at, payload)
    entries: Arc<DashMap<String, (Instant, Arc<SearchPayload>)>>,
    ttl: Duration,
}

impl ResponseStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::default(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the payload for `key` if it was stored less than one TTL ago.
    pub fn get(&self, key: &str) -> Option<Arc<SearchPayload>> {
        let entry = self.entries.get(key)?;
        let (stored_at, ref payload) = *entry;
        (stored_at.elapsed() < self.ttl).then(|| payload.clone())
    }

    /// Create or overwrite the entry for `key`, stamped now.
    pub fn put(&self, key: String, payload: Arc<SearchPayload>) {
        self.entries.insert(key, (Instant::now(), payload));
    }

    /// Total entries held, and how many of them are still fresh.
    pub fn counts(&self) -> (usize, usize) {
        let fresh = self
            .entries
            .iter()
            .filter(|entry| entry.value().0.elapsed() < self.ttl)
            .count();
        (self.entries.len(), fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    const TTL: Duration = Duration::from_secs(12 * 60 * 60);

    fn payload(body: &'static str) -> Arc<SearchPayload> {
        Arc::new(SearchPayload::from_body(Bytes::from_static(body.as_bytes())).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn entry_is_fresh_until_exactly_one_ttl() {
        let store = ResponseStore::new(TTL);
        store.put("term=jordan&limit=20".into(), payload("[]"));

        tokio::time::advance(TTL - Duration::from_millis(1)).await;
        assert!(store.get("term=jordan&limit=20").is_some());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(store.get("term=jordan&limit=20").is_none());
        // Expired entries are kept until overwritten.
        assert_eq!(store.counts(), (1, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn put_overwrites_and_restamps() {
        let store = ResponseStore::new(TTL);
        store.put("k".into(), payload(r#"[{"title":"old"}]"#));
        tokio::time::advance(TTL).await;

        store.put("k".into(), payload(r#"[{"title":"new"}]"#));
        let fresh = store.get("k").unwrap();
        assert_eq!(fresh.products[0].display_title(), "new");
        assert_eq!(store.counts(), (1, 1));
    }

    #[test]
    fn unknown_key_is_absent() {
        let store = ResponseStore::new(TTL);
        assert!(store.get("nothing").is_none());
    }
}
