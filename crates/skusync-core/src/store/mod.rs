//! Collaborator seams: remote file store, tabular data source, and resource
//! fetcher, with production Google implementations.
//!
//! The pipeline only ever talks to these traits; tests substitute in-memory
//! fakes and the Google clients stay thin.

mod drive;
mod fetcher;
mod sheets;

pub use drive::DriveStore;
pub use fetcher::HttpFetcher;
pub use sheets::SheetsClient;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::Deserialize;
use std::pin::Pin;
use thiserror::Error;

use crate::auth::AuthError;

/// One entry from a file-store listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
}

/// A single range update queued for batch write-back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeUpdate {
    /// A1 range the values land in (one row's own cell address).
    pub range: String,
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("remote returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response shape: {0}")]
    Decode(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Remote file store: folder search and image listing.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Exact-name search over non-trashed folders.
    async fn search_folders(&self, name: &str) -> Result<Vec<FileEntry>, StoreError>;
    /// Non-trashed `image/*` children of a folder.
    async fn list_images(&self, folder_id: &str) -> Result<Vec<FileEntry>, StoreError>;
}

/// Tabular data source: read a range, apply a batch of range updates.
#[async_trait]
pub trait SheetStore: Send + Sync {
    async fn get_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, StoreError>;

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        updates: &[RangeUpdate],
    ) -> Result<(), StoreError>;
}

/// Byte stream from a resource fetch.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StoreError>> + Send>>;

/// HTTP GET as a byte stream (non-2xx is an error, not a stream).
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get_stream(&self, url: &str) -> Result<ByteStream, StoreError>;
}
