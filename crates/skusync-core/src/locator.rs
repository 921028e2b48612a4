//! Image locator: deterministic choice of one representative image.
//!
//! Among a folder's image entries, the one whose name sorts first in byte
//! order wins. This is the only "which image" policy in the system; keep it
//! free of randomness or recency weighting so re-runs are reproducible.

use std::sync::Arc;

use crate::drive_link;
use crate::rate_limit::RateLimiter;
use crate::store::FileStore;

pub struct ImageLocator {
    store: Arc<dyn FileStore>,
    limiter: Arc<RateLimiter>,
}

impl ImageLocator {
    pub fn new(store: Arc<dyn FileStore>, limiter: Arc<RateLimiter>) -> Self {
        Self { store, limiter }
    }

    /// Fetchable view link for the folder's first image (by name), or `None`
    /// when the folder has no images or the listing failed.
    pub async fn first_image(&self, folder_id: &str) -> Option<String> {
        self.limiter.acquire().await;
        let mut entries = match self.store.list_images(folder_id).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(folder_id, error = %e, "image listing failed, skipping row");
                return None;
            }
        };
        if entries.is_empty() {
            tracing::warn!(folder_id, "folder contains no images");
            return None;
        }
        entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
        Some(drive_link::image_view_link(&entries[0].id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileEntry, StoreError};
    use async_trait::async_trait;

    struct FixedStore(Vec<FileEntry>);

    #[async_trait]
    impl FileStore for FixedStore {
        async fn search_folders(&self, _name: &str) -> Result<Vec<FileEntry>, StoreError> {
            unreachable!("locator never searches folders")
        }

        async fn list_images(&self, _folder_id: &str) -> Result<Vec<FileEntry>, StoreError> {
            Ok(self.0.clone())
        }
    }

    fn entry(id: &str, name: &str) -> FileEntry {
        FileEntry {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn locator(entries: Vec<FileEntry>) -> ImageLocator {
        ImageLocator::new(Arc::new(FixedStore(entries)), Arc::new(RateLimiter::new(10_000)))
    }

    #[tokio::test]
    async fn picks_lexicographically_first_name() {
        let l = locator(vec![
            entry("id-b", "b.jpg"),
            entry("id-a", "a.png"),
            entry("id-c", "c.gif"),
        ]);
        assert_eq!(
            l.first_image("folder").await.unwrap(),
            "https://drive.google.com/uc?export=view&id=id-a"
        );
    }

    #[tokio::test]
    async fn selection_is_stable_across_input_orders() {
        let names = ["03.jpg", "01.jpg", "02.jpg"];
        let forward = locator(names.iter().map(|n| entry(n, n)).collect());
        let reversed = locator(names.iter().rev().map(|n| entry(n, n)).collect());
        assert_eq!(
            forward.first_image("f").await,
            reversed.first_image("f").await
        );
    }

    #[tokio::test]
    async fn empty_folder_yields_none() {
        let l = locator(vec![]);
        assert!(l.first_image("folder").await.is_none());
    }
}
