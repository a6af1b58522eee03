use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Weekday;
use classbook_application::ScheduleRepository;
use classbook_core::AppResult;
use classbook_domain::{ScheduleEntry, ScheduledInterval, find_conflict};
use tokio::sync::RwLock;

/// In-memory schedule store keyed by entry id.
#[derive(Debug, Default)]
pub struct InMemoryScheduleRepository {
    entries: RwLock<HashMap<String, ScheduleEntry>>,
}

impl InMemoryScheduleRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryScheduleRepository {
    async fn list_entries(&self) -> AppResult<Vec<ScheduleEntry>> {
        Ok(self.entries.read().await.values().cloned().collect())
    }

    async fn find_entry(&self, entry_id: &str) -> AppResult<Option<ScheduleEntry>> {
        Ok(self.entries.read().await.get(entry_id).cloned())
    }

    async fn existing_entries(
        &self,
        group_id: &str,
        day: Weekday,
    ) -> AppResult<Vec<ScheduleEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .values()
            .filter(|entry| entry.group_id == group_id && entry.day == day)
            .cloned()
            .collect())
    }

    async fn save_if_free(
        &self,
        entry: ScheduleEntry,
        exclude_id: Option<&str>,
    ) -> AppResult<Option<ScheduledInterval>> {
        let mut entries = self.entries.write().await;
        let same_day: Vec<ScheduledInterval> = entries
            .values()
            .filter(|stored| stored.group_id == entry.group_id && stored.day == entry.day)
            .map(ScheduleEntry::interval)
            .collect();

        if let Some(conflict) = find_conflict(&entry.interval(), &same_day, exclude_id) {
            return Ok(Some(conflict.clone()));
        }

        entries.insert(entry.id.clone(), entry);
        Ok(None)
    }

    async fn delete_entry(&self, entry_id: &str) -> AppResult<bool> {
        Ok(self.entries.write().await.remove(entry_id).is_some())
    }
}
