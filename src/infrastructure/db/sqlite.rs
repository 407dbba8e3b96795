use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool},
    Pool, Sqlite,
};
use std::str::FromStr;

use async_trait::async_trait;
use uuid::Uuid;

use super::HistoryStore;
use crate::domain::equipment::{HistoryEntry, HISTORY_CAP};
use crate::domain::error::{AppError, Result};

/// Durable history store backed by SQLite.
///
/// One row per history entry; retention is enforced by the prune step in
/// `append`, run in the same transaction as the insert so the cap holds
/// under concurrent writers.
pub struct SqliteHistoryStore {
    pool: Pool<Sqlite>,
}

impl SqliteHistoryStore {
    pub async fn init(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to parse connection string: {}", e))
            })?
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("Failed to connect: {}", e)))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS equipment_datasets (
                id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                upload_date DATETIME NOT NULL,
                summary_json TEXT NOT NULL,
                raw_data_json TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create table: {}", e)))?;

        Ok(Self { pool })
    }
}

/// Classify sqlx failures: connection-level problems trigger the offline
/// fallback, everything else surfaces as a database error.
fn store_err(context: &str, err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => {
            AppError::StoreUnavailable(format!("{}: {}", context, err))
        }
        _ => AppError::DatabaseError(format!("{}: {}", context, err)),
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn append(&self, entry: &HistoryEntry) -> Result<()> {
        let summary_json = serde_json::to_string(&entry.summary)?;
        let raw_data_json = serde_json::to_string(&entry.records)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_err("Failed to begin transaction", e))?;

        sqlx::query(
            "INSERT INTO equipment_datasets (id, filename, upload_date, summary_json, raw_data_json)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(&entry.filename)
        .bind(entry.timestamp)
        .bind(summary_json)
        .bind(raw_data_json)
        .execute(&mut *tx)
        .await
        .map_err(|e| store_err("Failed to insert history entry", e))?;

        // Prune to the newest entries; insertion order (not access order)
        // decides eviction.
        sqlx::query(
            "DELETE FROM equipment_datasets WHERE id NOT IN (
                SELECT id FROM equipment_datasets
                ORDER BY upload_date DESC, id DESC LIMIT ?
            )",
        )
        .bind(HISTORY_CAP as i64)
        .execute(&mut *tx)
        .await
        .map_err(|e| store_err("Failed to prune history", e))?;

        tx.commit()
            .await
            .map_err(|e| store_err("Failed to commit history entry", e))?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<HistoryEntry>> {
        sqlx::query_as::<_, DatasetEntity>(
            "SELECT id, filename, upload_date, summary_json, raw_data_json
             FROM equipment_datasets ORDER BY upload_date DESC, id DESC LIMIT ?",
        )
        .bind(HISTORY_CAP as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_err("Failed to fetch history", e))?
        .into_iter()
        .map(DatasetEntity::into_entry)
        .collect()
    }

    async fn get(&self, id: &Uuid) -> Result<Option<HistoryEntry>> {
        sqlx::query_as::<_, DatasetEntity>(
            "SELECT id, filename, upload_date, summary_json, raw_data_json
             FROM equipment_datasets WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_err("Failed to fetch history entry", e))?
        .map(DatasetEntity::into_entry)
        .transpose()
    }
}

// Internal entity for database mapping
#[derive(sqlx::FromRow)]
struct DatasetEntity {
    id: String,
    filename: String,
    upload_date: chrono::DateTime<chrono::Utc>,
    summary_json: String,
    raw_data_json: String,
}

impl DatasetEntity {
    fn into_entry(self) -> Result<HistoryEntry> {
        let id = Uuid::from_str(&self.id)
            .map_err(|e| AppError::DatabaseError(format!("Corrupt entry id '{}': {}", self.id, e)))?;
        let summary = serde_json::from_str(&self.summary_json)
            .map_err(|e| AppError::DatabaseError(format!("Corrupt summary_json: {}", e)))?;
        let records = serde_json::from_str(&self.raw_data_json)
            .map_err(|e| AppError::DatabaseError(format!("Corrupt raw_data_json: {}", e)))?;

        Ok(HistoryEntry {
            id,
            filename: self.filename,
            timestamp: self.upload_date,
            records,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::equipment::{EquipmentRecord, Summary};
    use std::collections::BTreeMap;

    // A pooled `sqlite::memory:` URL gives every connection its own
    // database, so tests use a file in a temp dir instead.
    async fn file_store() -> (tempfile::TempDir, SqliteHistoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("history.db").display());
        let store = SqliteHistoryStore::init(&url).await.unwrap();
        (dir, store)
    }

    fn entry(filename: &str) -> HistoryEntry {
        let records = vec![EquipmentRecord {
            name: "Pump1".to_string(),
            equipment_type: "Pump".to_string(),
            flowrate: 100.0,
            pressure: 50.0,
            temperature: 30.0,
            extra: BTreeMap::new(),
        }];
        let summary = crate::application::use_cases::summarizer::summarize(&records);
        HistoryEntry::new(filename, records, summary)
    }

    #[tokio::test]
    async fn test_append_then_get_round_trips() {
        let (_dir, store) = file_store().await;
        let original = entry("a.csv");
        store.append(&original).await.unwrap();

        let fetched = store.get(&original.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, original.id);
        assert_eq!(fetched.filename, "a.csv");
        assert_eq!(fetched.records, original.records);
        assert_eq!(fetched.summary, original.summary);
    }

    #[tokio::test]
    async fn test_prune_evicts_oldest() {
        let (_dir, store) = file_store().await;
        let mut entries = Vec::new();
        for i in 1..=6i64 {
            // Distinct timestamps so recency ordering is unambiguous.
            let mut e = entry(&format!("f{}", i));
            e.timestamp = chrono::Utc::now() + chrono::Duration::seconds(i);
            store.append(&e).await.unwrap();
            entries.push(e);
        }

        let listed = store.list().await.unwrap();
        let names: Vec<_> = listed.iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names, vec!["f6", "f5", "f4", "f3", "f2"]);
        assert_eq!(store.get(&entries[0].id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_none() {
        let (_dir, store) = file_store().await;
        assert_eq!(store.get(&Uuid::new_v4()).await.unwrap(), None);
    }
}
