use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::HistoryStore;
use crate::domain::equipment::HistoryEntry;
use crate::domain::error::{AppError, Result};

/// History store backed by an upstream HTTP API.
///
/// Every request carries a bounded timeout; timeouts and connection
/// failures surface as `StoreUnavailable` so the ingestion service can
/// fall back to the local store instead of hanging.
pub struct RemoteHistoryStore {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize, Deserialize)]
struct HistoryPayload {
    history: Vec<HistoryEntry>,
}

impl RemoteHistoryStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request_err(context: &str, err: reqwest::Error) -> AppError {
        if err.is_timeout() || err.is_connect() {
            AppError::StoreUnavailable(format!("{}: {}", context, err))
        } else {
            AppError::Internal(format!("{}: {}", context, err))
        }
    }

    async fn fetch_history(&self) -> Result<Vec<HistoryEntry>> {
        let url = format!("{}/history/", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::request_err("History request failed", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::StoreUnavailable(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let payload: HistoryPayload = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse history JSON: {}", e)))?;

        Ok(payload.history)
    }
}

#[async_trait]
impl HistoryStore for RemoteHistoryStore {
    async fn append(&self, entry: &HistoryEntry) -> Result<()> {
        let url = format!("{}/history/", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(entry)
            .send()
            .await
            .map_err(|e| Self::request_err("Append request failed", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::StoreUnavailable(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        Ok(())
    }

    async fn list(&self) -> Result<Vec<HistoryEntry>> {
        self.fetch_history().await
    }

    // The upstream API only exposes the history listing, so lookups scan
    // the listed entries.
    async fn get(&self, id: &Uuid) -> Result<Option<HistoryEntry>> {
        Ok(self.fetch_history().await?.into_iter().find(|e| &e.id == id))
    }
}
