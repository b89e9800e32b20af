//! Row-store collaborator: the management spreadsheet.
//!
//! The store receives an ordered sequence of cell values per fulfillment and
//! is tolerant of being absent: an unconfigured or unreachable store is a
//! degraded-mode condition the caller logs and survives.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::error::{AppError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Append-only persistence boundary. Cell contents (including formula
/// strings) are opaque text to this system.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn append_record(&self, row: Vec<String>) -> Result<()>;
}

/// Appends rows through a Sheets-style `values:append` endpoint.
#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    append_url: String,
    token: String,
}

impl SheetsClient {
    pub fn new(append_url: &str, token: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client construction cannot fail with static config");

        Self {
            client,
            append_url: append_url.to_string(),
            token: token.to_string(),
        }
    }
}

#[async_trait]
impl RecordStore for SheetsClient {
    async fn append_record(&self, row: Vec<String>) -> Result<()> {
        let body = json!({
            "majorDimension": "ROWS",
            "values": [row],
        });

        let response = self
            .client
            .post(&self.append_url)
            .bearer_auth(&self.token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Sheet append error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Sheet append failed: {} - {}",
                status, error_text
            )));
        }

        Ok(())
    }
}

/// Used when no spreadsheet is configured. Every append fails so the caller
/// logs the loss; the request itself still succeeds (degraded mode).
pub struct DisabledStore;

#[async_trait]
impl RecordStore for DisabledStore {
    async fn append_record(&self, _row: Vec<String>) -> Result<()> {
        Err(AppError::Upstream("Record store not configured".into()))
    }
}
