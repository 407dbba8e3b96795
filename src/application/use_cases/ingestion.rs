// ============================================================
// INGESTION USE CASE
// ============================================================
// Orchestrate parse -> summarize -> persist, with an offline
// fallback when the history store is unreachable

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::application::use_cases::summarizer::summarize;
use crate::domain::equipment::HistoryEntry;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::csv::CsvParser;
use crate::infrastructure::db::{HistoryStore, MemoryHistoryStore};

/// Ingestion pipeline for equipment CSV uploads.
///
/// Constructed once per process and shared by reference. Validation
/// failures short-circuit before any persistence attempt; a store outage
/// never fails the ingest, it reroutes the entry to a local capped store
/// with the filename tagged so consumers can tell the difference.
pub struct IngestionService {
    store: Arc<dyn HistoryStore>,
    fallback: MemoryHistoryStore,
    parser: CsvParser,
}

impl IngestionService {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self {
            store,
            fallback: MemoryHistoryStore::new(),
            parser: CsvParser::new(),
        }
    }

    /// Run the full pipeline for one upload.
    pub async fn ingest(&self, bytes: &[u8], filename: &str) -> Result<HistoryEntry> {
        let records = self.parser.parse(bytes)?;
        let summary = summarize(&records);
        let entry = HistoryEntry::new(filename, records, summary);

        match self.store.append(&entry).await {
            Ok(()) => {
                info!(
                    filename,
                    records = entry.records.len(),
                    "Ingested upload"
                );
                Ok(entry)
            }
            Err(AppError::StoreUnavailable(reason)) => {
                warn!(filename, %reason, "History store unreachable, keeping upload locally");
                let entry = entry.tagged_offline();
                self.fallback.append(&entry).await?;
                Ok(entry)
            }
            Err(err) => Err(err),
        }
    }

    /// History snapshot, most recent first. Served from the offline store
    /// while the primary is unreachable.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        match self.store.list().await {
            Err(AppError::StoreUnavailable(reason)) => {
                warn!(%reason, "History store unreachable, listing offline entries");
                self.fallback.list().await
            }
            other => other,
        }
    }

    /// Look up a single past ingestion by id.
    pub async fn entry(&self, id: &Uuid) -> Result<Option<HistoryEntry>> {
        match self.store.get(id).await {
            Err(AppError::StoreUnavailable(reason)) => {
                warn!(%reason, "History store unreachable, checking offline entries");
                self.fallback.get(id).await
            }
            other => other,
        }
    }
}
