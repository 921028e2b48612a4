//! Google Sheets values client: range read and batch write-back.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{RangeUpdate, SheetStore, StoreError};
use crate::auth::CredentialProvider;

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Deserialize)]
struct ValueRangeResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ValueRangeBody<'a> {
    range: &'a str,
    #[serde(rename = "majorDimension")]
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

#[derive(Debug, Serialize)]
struct BatchUpdateBody<'a> {
    #[serde(rename = "valueInputOption")]
    value_input_option: &'static str,
    data: Vec<ValueRangeBody<'a>>,
}

pub struct SheetsClient {
    client: Client,
    creds: Arc<dyn CredentialProvider>,
    base_url: String,
}

impl SheetsClient {
    pub fn new(client: Client, creds: Arc<dyn CredentialProvider>) -> Self {
        Self::with_base_url(client, creds, SHEETS_BASE_URL)
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

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl SheetStore for SheetsClient {
    async fn get_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, StoreError> {
        let token = self.creds.access_token().await?;
        let url = format!("{}/{}/values/{}", self.base_url, spreadsheet_id, range);
        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let response = Self::check(response).await?;
        let body: ValueRangeResponse = response.json().await?;
        Ok(body.values)
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        updates: &[RangeUpdate],
    ) -> Result<(), StoreError> {
        let token = self.creds.access_token().await?;
        let url = format!(
            "{}/{}/values:batchUpdate",
            self.base_url, spreadsheet_id
        );
        // USER_ENTERED so =IMAGE(...) is written as a live formula.
        let body = BatchUpdateBody {
            value_input_option: "USER_ENTERED",
            data: updates
                .iter()
                .map(|u| ValueRangeBody {
                    range: &u.range,
                    major_dimension: "ROWS",
                    values: &u.values,
                })
                .collect(),
        };
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        tracing::debug!(ranges = updates.len(), "batch update applied");
        Ok(())
    }
}
