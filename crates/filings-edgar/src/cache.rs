//! Time-bounded cache of decoded submissions documents.

use chrono::{DateTime, TimeDelta, Utc};
use filings_core::Cik;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::manifest::Submissions;

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: TimeDelta) -> bool {
        Utc::now().signed_duration_since(self.cached_at) > ttl
    }
}

/// Per-company cache of submissions documents.
///
/// Stale entries are never returned; [`purge_stale`](Self::purge_stale)
/// removes them. Reads and writes go through one `RwLock`.
#[derive(Debug)]
pub struct ManifestCache {
    entries: RwLock<HashMap<Cik, CacheEntry<Submissions>>>,
    ttl: TimeDelta,
}

impl ManifestCache {
    /// Creates an empty cache whose entries stay valid for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Returns the cached document for `cik` if it is still valid.
    pub async fn get(&self, cik: Cik) -> Option<Submissions> {
        let entries = self.entries.read().await;
        match entries.get(&cik) {
            Some(entry) if !entry.is_stale(self.ttl) => {
                debug!(%cik, "Manifest cache hit");
                Some(entry.data.clone())
            }
            Some(_) => {
                debug!(%cik, "Manifest cache entry is stale");
                None
            }
            None => {
                debug!(%cik, "Manifest cache miss");
                None
            }
        }
    }

    /// Stores a document, replacing any previous entry for the company.
    pub async fn put(&self, cik: Cik, submissions: Submissions) {
        self.entries
            .write()
            .await
            .insert(cik, CacheEntry::new(submissions));
    }

    /// Removes the entry for one company.
    pub async fn invalidate(&self, cik: Cik) {
        self.entries.write().await.remove(&cik);
    }

    /// Removes every stale entry and returns how many were removed.
    pub async fn purge_stale(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_stale(self.ttl));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "Purged stale manifests");
        }
        removed
    }

    /// Removes every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Returns the number of entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filings_core::{CompanyProfile, FilingManifest};

    fn submissions(cik: Cik) -> Submissions {
        Submissions {
            profile: CompanyProfile {
                cik,
                name: "Apple Inc.".to_string(),
                sic: Some("3571".to_string()),
                sic_description: None,
                industry: "Technology - Hardware".to_string(),
                tickers: vec!["AAPL".to_string()],
                exchanges: Vec::new(),
            },
            manifest: FilingManifest::new(cik, Vec::new()),
        }
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = ManifestCache::new(Duration::from_secs(300));
        let cik = Cik::parse("320193").unwrap();

        assert!(cache.get(cik).await.is_none());
        cache.put(cik, submissions(cik)).await;

        let cached = cache.get(cik).await.unwrap();
        assert_eq!(cached.profile.name, "Apple Inc.");
    }

    #[tokio::test]
    async fn test_stale_entries_are_not_returned() {
        let cache = ManifestCache::new(Duration::ZERO);
        let cik = Cik::parse("320193").unwrap();

        cache.put(cik, submissions(cik)).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(cache.get(cik).await.is_none());
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.purge_stale().await, 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let cache = ManifestCache::new(Duration::from_secs(300));
        let apple = Cik::parse("320193").unwrap();
        let microsoft = Cik::parse("789019").unwrap();

        cache.put(apple, submissions(apple)).await;
        cache.put(microsoft, submissions(microsoft)).await;

        cache.invalidate(apple).await;
        assert!(cache.get(apple).await.is_none());
        assert!(cache.get(microsoft).await.is_some());

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
