//! Google Drive `files.list` client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use super::{FileEntry, FileStore, StoreError};
use crate::auth::CredentialProvider;

const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

#[derive(Debug, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<FileEntry>,
}

pub struct DriveStore {
    client: Client,
    creds: Arc<dyn CredentialProvider>,
    base_url: String,
}

impl DriveStore {
    pub fn new(client: Client, creds: Arc<dyn CredentialProvider>) -> Self {
        Self::with_base_url(client, creds, DRIVE_BASE_URL)
    }

    /// Override the API endpoint (local test servers).
    pub fn with_base_url(
        client: Client,
        creds: Arc<dyn CredentialProvider>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            creds,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn list_files(&self, query: &str) -> Result<Vec<FileEntry>, StoreError> {
        let token = self.creds.access_token().await?;
        let url = format!("{}/files", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("q", query), ("fields", "files(id, name)")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }
        let list: FileListResponse = response.json().await?;
        Ok(list.files)
    }
}

/// Escape a value for embedding in a Drive query string literal.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl FileStore for DriveStore {
    async fn search_folders(&self, name: &str) -> Result<Vec<FileEntry>, StoreError> {
        let query = format!(
            "name = '{}' and mimeType = 'application/vnd.google-apps.folder' and trashed = false",
            escape_query_value(name)
        );
        tracing::debug!(sku = name, %query, "searching folders");
        self.list_files(&query).await
    }

    async fn list_images(&self, folder_id: &str) -> Result<Vec<FileEntry>, StoreError> {
        let query = format!(
            "'{}' in parents and mimeType contains 'image/' and trashed = false",
            escape_query_value(folder_id)
        );
        tracing::debug!(folder_id, %query, "listing folder images");
        self.list_files(&query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_values_are_escaped() {
        assert_eq!(escape_query_value("plain-sku"), "plain-sku");
        assert_eq!(escape_query_value("it's"), "it\\'s");
        assert_eq!(escape_query_value(r"a\b"), r"a\\b");
    }
}
