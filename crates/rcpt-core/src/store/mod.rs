//! Expense persistence over a pluggable key-value capability.

#[cfg(feature = "native")]
mod file;
mod memory;
pub mod query;
mod samples;
pub mod stats;

#[cfg(feature = "native")]
pub use file::FileKv;
pub use memory::MemoryKv;
pub use query::{ExpenseQuery, SortKey, SortOrder, average_amount, total_amount};
pub use samples::{manual_test_expense, sample_expenses};
pub use stats::{AccuracyStats, ConfidenceBand, StoreSummary, monthly_breakdown};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::StorageError;
use crate::models::ExpenseRecord;

/// Key under which the expense collection is stored by default.
pub const DEFAULT_KEY: &str = "expenses";

/// Exclusive hold on a key, released on drop.
pub trait KeyLock: Send + Sync {}

impl KeyLock for () {}

/// String key-value persistence.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete `key`; deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Exclude other writers of `key` until the returned guard is dropped.
    ///
    /// Stores shared only within one process may rely on the caller's own
    /// locking and keep this default.
    async fn lock(&self, _key: &str) -> Result<Box<dyn KeyLock>, StorageError> {
        Ok(Box::new(()))
    }
}

/// The expense collection, stored newest first as one JSON array.
///
/// Every read-modify-write cycle holds an async mutex plus the backing
/// store's key lock, so concurrent appends never overwrite each other, even
/// from separate store handles or processes sharing one data directory.
pub struct ExpenseStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    write_lock: Mutex<()>,
}

impl ExpenseStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            key: DEFAULT_KEY.to_string(),
            write_lock: Mutex::new(()),
        }
    }

    /// A store backed by process memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKv::new()))
    }

    /// Use a different collection key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    async fn load(&self) -> Result<Vec<ExpenseRecord>, StorageError> {
        match self.kv.get(&self.key).await? {
            None => Ok(Vec::new()),
            Some(blob) if blob.trim().is_empty() => Ok(Vec::new()),
            Some(blob) => serde_json::from_str(&blob).map_err(|source| StorageError::Corrupt {
                key: self.key.clone(),
                source,
            }),
        }
    }

    /// Hold both locks for one read-modify-write cycle.
    async fn exclusive(&self) -> Result<(MutexGuard<'_, ()>, Box<dyn KeyLock>), StorageError> {
        let guard = self.write_lock.lock().await;
        let key_lock = self.kv.lock(&self.key).await?;
        Ok((guard, key_lock))
    }

    async fn save(&self, records: &[ExpenseRecord]) -> Result<(), StorageError> {
        let blob = serde_json::to_string(records).map_err(StorageError::Serialize)?;
        self.kv.set(&self.key, blob).await
    }

    /// Prepend a record and persist the collection.
    pub async fn append(&self, record: ExpenseRecord) -> Result<ExpenseRecord, StorageError> {
        let _locks = self.exclusive().await?;

        let mut records = self.load().await?;
        records.insert(0, record.clone());
        self.save(&records).await?;

        debug!(id = %record.id, count = records.len(), "Stored expense");
        Ok(record)
    }

    /// All records, newest first.
    pub async fn list(&self) -> Result<Vec<ExpenseRecord>, StorageError> {
        self.load().await
    }

    /// Look up a record by id.
    pub async fn get(&self, id: &str) -> Result<Option<ExpenseRecord>, StorageError> {
        Ok(self.load().await?.into_iter().find(|r| r.id == id))
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<usize, StorageError> {
        Ok(self.load().await?.len())
    }

    /// Delete a record by id. Returns whether a record was removed.
    pub async fn remove(&self, id: &str) -> Result<bool, StorageError> {
        let _locks = self.exclusive().await?;

        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }

        self.save(&records).await?;
        info!("Deleted expense {}", id);
        Ok(true)
    }

    /// Delete the whole collection. Returns the number of records removed.
    pub async fn clear(&self) -> Result<usize, StorageError> {
        let _locks = self.exclusive().await?;

        let removed = self.load().await.map(|r| r.len()).unwrap_or(0);
        self.kv.remove(&self.key).await?;
        info!("Cleared {} expenses", removed);
        Ok(removed)
    }

    /// Insert the two canned pipeline samples, only into an empty store.
    ///
    /// Returns the number of records inserted.
    pub async fn seed_samples(&self) -> Result<usize, StorageError> {
        let _locks = self.exclusive().await?;

        let records = self.load().await?;
        if !records.is_empty() {
            debug!("Store not empty, skipping samples");
            return Ok(0);
        }

        let samples = sample_expenses(Utc::now());
        self.save(&samples).await?;
        info!("Added {} sample expenses", samples.len());
        Ok(samples.len())
    }

    /// Filtered and sorted view of the collection.
    pub async fn query(&self, query: &ExpenseQuery) -> Result<Vec<ExpenseRecord>, StorageError> {
        Ok(query.apply(&self.load().await?))
    }

    /// High-confidence share of pipeline records.
    pub async fn accuracy_stats(&self) -> Result<AccuracyStats, StorageError> {
        Ok(AccuracyStats::from_records(&self.load().await?))
    }

    /// Counts and total amount.
    pub async fn summary(&self) -> Result<StoreSummary, StorageError> {
        Ok(StoreSummary::from_records(&self.load().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryLabel, ProcessedBy};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn record(id: &str) -> ExpenseRecord {
        ExpenseRecord {
            id: id.into(),
            merchant_name: format!("Merchant {}", id),
            total_amount: Decimal::new(100, 2),
            date: None,
            category: CategoryLabel::Other,
            confidence: None,
            line_items: vec![],
            reasoning: None,
            full_text: None,
            image_uri: None,
            subtotal_amount: None,
            gst_amount: None,
            created_at: Utc::now(),
            processed_by: ProcessedBy::ManualEntry,
        }
    }

    #[tokio::test]
    async fn test_append_prepends() {
        let store = ExpenseStore::in_memory();
        store.append(record("a")).await.unwrap();
        store.append(record("b")).await.unwrap();

        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(store.get("a").await.unwrap().unwrap().merchant_name, "Merchant a");
    }

    #[tokio::test]
    async fn test_remove() {
        let store = ExpenseStore::in_memory();
        store.append(record("a")).await.unwrap();
        store.append(record("b")).await.unwrap();

        assert!(store.remove("a").await.unwrap());
        assert!(!store.remove("a").await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = ExpenseStore::in_memory();
        store.append(record("a")).await.unwrap();

        assert_eq!(store.clear().await.unwrap(), 1);
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(store.clear().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let store = ExpenseStore::in_memory();
        assert_eq!(store.seed_samples().await.unwrap(), 2);
        assert_eq!(store.seed_samples().await.unwrap(), 0);

        let summary = store.summary().await.unwrap();
        assert_eq!(summary.expense_count, 2);
        assert_eq!(summary.ocr_count, 2);
        assert_eq!(summary.total_amount, Decimal::new(5803, 2));

        let stats = store.accuracy_stats().await.unwrap();
        assert_eq!(stats.high_confidence, 2);
        assert_eq!(stats.accuracy, 1.0);
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_reported() {
        let kv = Arc::new(MemoryKv::new());
        kv.set(DEFAULT_KEY, "{not json".into()).await.unwrap();
        let store = ExpenseStore::new(kv);

        assert!(matches!(store.list().await, Err(StorageError::Corrupt { .. })));
        assert!(store.append(record("a")).await.is_err());
    }

    #[tokio::test]
    async fn test_custom_key() {
        let kv = Arc::new(MemoryKv::new());
        let store = ExpenseStore::new(kv.clone()).with_key("ledger");
        store.append(record("a")).await.unwrap();

        assert!(kv.get("ledger").await.unwrap().is_some());
        assert!(kv.get(DEFAULT_KEY).await.unwrap().is_none());
    }

    #[cfg(feature = "native")]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_store_handles_sharing_a_dir_keep_every_append() {
        let dir = tempfile::tempdir().unwrap();
        let first = Arc::new(ExpenseStore::new(Arc::new(FileKv::new(dir.path()))));
        let second = Arc::new(ExpenseStore::new(Arc::new(FileKv::new(dir.path()))));

        let mut tasks = Vec::new();
        for i in 0..20 {
            let store = if i % 2 == 0 { first.clone() } else { second.clone() };
            tasks.push(tokio::spawn(async move {
                store.append(record(&format!("r{}", i))).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let mut ids: Vec<String> = first.list().await.unwrap().into_iter().map(|r| r.id).collect();
        ids.sort();
        let mut expected: Vec<String> = (0..20).map(|i| format!("r{}", i)).collect();
        expected.sort();
        assert_eq!(ids, expected);
        assert_eq!(second.count().await.unwrap(), 20);
    }

    #[cfg(feature = "native")]
    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = ExpenseStore::new(Arc::new(FileKv::new(dir.path())));
            store.append(record("a")).await.unwrap();
        }

        let reopened = ExpenseStore::new(Arc::new(FileKv::new(dir.path())));
        let records = reopened.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "a");
    }
}
