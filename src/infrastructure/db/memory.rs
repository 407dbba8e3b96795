use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::HistoryStore;
use crate::domain::equipment::{HistoryEntry, HISTORY_CAP};
use crate::domain::error::{AppError, Result};

/// In-memory history store.
///
/// Backs the offline fallback path and tests. The mutex is held across
/// the insert-and-prune sequence so the cap invariant holds under
/// concurrent appends.
pub struct MemoryHistoryStore {
    entries: Mutex<VecDeque<HistoryEntry>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(HISTORY_CAP + 1)),
        }
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, VecDeque<HistoryEntry>>> {
        self.entries
            .lock()
            .map_err(|_| AppError::Internal("History lock poisoned".to_string()))
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, entry: &HistoryEntry) -> Result<()> {
        let mut entries = self.locked()?;
        entries.push_front(entry.clone());
        while entries.len() > HISTORY_CAP {
            entries.pop_back();
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.locked()?.iter().cloned().collect())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<HistoryEntry>> {
        Ok(self.locked()?.iter().find(|e| &e.id == id).cloned())
    }
}
