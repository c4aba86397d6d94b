use std::time::Duration;

use crate::models::Reading;

/// Short-TTL in-memory cache for congestion readings.
///
/// A transparent decorator around the per-location fetch: hits skip the
/// upstream call, misses fall through. Only successful readings are
/// stored, so a degraded answer never masks a recovered upstream for
/// the whole TTL.
pub struct ReadingCache {
    inner: moka::future::Cache<String, Reading>,
}

impl ReadingCache {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let inner = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        Self { inner }
    }

    pub async fn get(&self, location: &str) -> Option<Reading> {
        let cached = self.inner.get(&Self::key(location)).await;
        match &cached {
            Some(_) => tracing::trace!(location, "cache hit"),
            None => tracing::trace!(location, "cache miss"),
        }
        cached
    }

    pub async fn insert(&self, location: &str, reading: Reading) {
        self.inner.insert(Self::key(location), reading).await;
        tracing::trace!(location, "cache set");
    }

    pub async fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    fn key(location: &str) -> String {
        format!("congestion:{}", location)
    }
}
