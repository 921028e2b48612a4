//! HTTP GET as a byte stream for the download stage.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;

use super::{ByteStream, Fetcher, StoreError};

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get_stream(&self, url: &str) -> Result<ByteStream, StoreError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(Box::pin(
            response.bytes_stream().map(|chunk| chunk.map_err(StoreError::from)),
        ))
    }
}
