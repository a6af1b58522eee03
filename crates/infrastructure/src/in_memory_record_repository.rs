use std::collections::HashMap;

use async_trait::async_trait;
use classbook_application::RecordRepository;
use classbook_core::AppResult;
use classbook_domain::JournalRecord;
use tokio::sync::RwLock;

/// In-memory store for one kind of journal record, keyed by record id.
#[derive(Debug)]
pub struct InMemoryRecordRepository<T> {
    records: RwLock<HashMap<String, T>>,
}

impl<T> InMemoryRecordRepository<T> {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> Default for InMemoryRecordRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: JournalRecord> RecordRepository<T> for InMemoryRecordRepository<T> {
    async fn list_records(&self) -> AppResult<Vec<T>> {
        let mut records: Vec<T> = self.records.read().await.values().cloned().collect();
        records.sort_by(|left, right| left.record_id().cmp(right.record_id()));
        Ok(records)
    }

    async fn find_record(&self, record_id: &str) -> AppResult<Option<T>> {
        Ok(self.records.read().await.get(record_id).cloned())
    }

    async fn save_record(&self, record: T) -> AppResult<()> {
        self.records
            .write()
            .await
            .insert(record.record_id().to_owned(), record);
        Ok(())
    }

    async fn delete_record(&self, record_id: &str) -> AppResult<bool> {
        Ok(self.records.write().await.remove(record_id).is_some())
    }
}
