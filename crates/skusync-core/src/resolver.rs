//! Folder resolver: SKU -> remote folder, memoized per run.
//!
//! Remote failures are soft: the row is skipped, the run continues. The
//! cache also remembers misses so a SKU repeated across rows costs at most
//! one remote query per run. The lock is not held across the remote call,
//! so two workers racing on the same fresh SKU may both query; results are
//! idempotent and the second insert overwrites with an equal value.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::MatchPolicy;
use crate::drive_link;
use crate::rate_limit::RateLimiter;
use crate::store::{FileEntry, FileStore};

/// Resolved pointer to a remote folder matching a SKU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRef {
    pub id: String,
    /// Browsable link derived from the id.
    pub link: String,
}

impl FolderRef {
    fn from_entry(entry: &FileEntry) -> Self {
        Self {
            id: entry.id.clone(),
            link: drive_link::folder_link(&entry.id),
        }
    }
}

pub struct FolderResolver {
    store: Arc<dyn FileStore>,
    limiter: Arc<RateLimiter>,
    policy: MatchPolicy,
    cache: Mutex<HashMap<String, Option<FolderRef>>>,
}

impl FolderResolver {
    pub fn new(store: Arc<dyn FileStore>, limiter: Arc<RateLimiter>, policy: MatchPolicy) -> Self {
        Self {
            store,
            limiter,
            policy,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Find the folder named exactly `sku`. `None` covers both "no match"
    /// and a failed query; the distinction is logged, not propagated.
    pub async fn resolve(&self, sku: &str) -> Option<FolderRef> {
        if let Some(cached) = self.cache.lock().await.get(sku) {
            tracing::trace!(sku, "resolver cache hit");
            return cached.clone();
        }

        self.limiter.acquire().await;
        let result = match self.store.search_folders(sku).await {
            Ok(entries) => self.pick(sku, &entries),
            Err(e) => {
                tracing::warn!(sku, error = %e, "folder search failed, skipping row");
                None
            }
        };

        self.cache
            .lock()
            .await
            .insert(sku.to_string(), result.clone());
        result
    }

    fn pick(&self, sku: &str, entries: &[FileEntry]) -> Option<FolderRef> {
        match entries {
            [] => {
                tracing::warn!(sku, "no folder matches SKU");
                None
            }
            [single] => Some(FolderRef::from_entry(single)),
            [first, ..] => match self.policy {
                MatchPolicy::First => {
                    tracing::warn!(
                        sku,
                        matches = entries.len(),
                        chosen = %first.id,
                        "multiple folders match SKU, taking first result"
                    );
                    Some(FolderRef::from_entry(first))
                }
                MatchPolicy::SkipAmbiguous => {
                    tracing::warn!(
                        sku,
                        matches = entries.len(),
                        "multiple folders match SKU, skipping per match policy"
                    );
                    None
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStore {
        searches: AtomicUsize,
        results: Vec<FileEntry>,
        fail: bool,
    }

    impl CountingStore {
        fn with_results(results: Vec<FileEntry>) -> Self {
            Self {
                searches: AtomicUsize::new(0),
                results,
                fail: false,
            }
        }
    }

    #[async_trait]
    impl FileStore for CountingStore {
        async fn search_folders(&self, _name: &str) -> Result<Vec<FileEntry>, StoreError> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StoreError::Status {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(self.results.clone())
        }

        async fn list_images(&self, _folder_id: &str) -> Result<Vec<FileEntry>, StoreError> {
            unreachable!("resolver never lists images")
        }
    }

    fn entry(id: &str) -> FileEntry {
        FileEntry {
            id: id.to_string(),
            name: "sku".to_string(),
        }
    }

    fn resolver(store: Arc<CountingStore>, policy: MatchPolicy) -> FolderResolver {
        FolderResolver::new(store, Arc::new(RateLimiter::new(10_000)), policy)
    }

    #[tokio::test]
    async fn repeated_skus_hit_the_store_once() {
        let store = Arc::new(CountingStore::with_results(vec![entry("f1")]));
        let r = resolver(Arc::clone(&store), MatchPolicy::First);

        let a = r.resolve("sku-1").await.unwrap();
        let b = r.resolve("sku-1").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.searches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn misses_are_cached_too() {
        let store = Arc::new(CountingStore::with_results(vec![]));
        let r = resolver(Arc::clone(&store), MatchPolicy::First);

        assert!(r.resolve("ghost").await.is_none());
        assert!(r.resolve("ghost").await.is_none());
        assert_eq!(store.searches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn remote_failure_is_a_soft_miss() {
        let store = Arc::new(CountingStore {
            searches: AtomicUsize::new(0),
            results: vec![],
            fail: true,
        });
        let r = resolver(Arc::clone(&store), MatchPolicy::First);
        assert!(r.resolve("sku-1").await.is_none());
    }

    #[tokio::test]
    async fn first_policy_takes_first_of_many() {
        let store = Arc::new(CountingStore::with_results(vec![entry("f1"), entry("f2")]));
        let r = resolver(store, MatchPolicy::First);
        assert_eq!(r.resolve("dup").await.unwrap().id, "f1");
    }

    #[tokio::test]
    async fn skip_ambiguous_policy_drops_duplicates() {
        let store = Arc::new(CountingStore::with_results(vec![entry("f1"), entry("f2")]));
        let r = resolver(store, MatchPolicy::SkipAmbiguous);
        assert!(r.resolve("dup").await.is_none());
    }

    #[tokio::test]
    async fn link_is_derived_from_id() {
        let store = Arc::new(CountingStore::with_results(vec![entry("abc123")]));
        let r = resolver(store, MatchPolicy::First);
        let folder = r.resolve("sku-1").await.unwrap();
        assert_eq!(folder.link, "https://drive.google.com/drive/folders/abc123");
    }
}
