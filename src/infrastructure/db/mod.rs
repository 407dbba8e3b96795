pub mod memory;
pub mod remote;
pub mod sqlite;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::equipment::HistoryEntry;
use crate::domain::error::Result;

pub use memory::MemoryHistoryStore;
pub use remote::RemoteHistoryStore;
pub use sqlite::SqliteHistoryStore;

/// Bounded history of past ingestions, most recent first.
///
/// Implementations must enforce the 5-entry cap atomically: concurrent
/// appends may never leave more than 5 entries visible or evict anything
/// but the oldest. `list` and `get` return owned snapshots.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, entry: &HistoryEntry) -> Result<()>;

    async fn list(&self) -> Result<Vec<HistoryEntry>>;

    async fn get(&self, id: &Uuid) -> Result<Option<HistoryEntry>>;
}
