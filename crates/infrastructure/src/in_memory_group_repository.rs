use std::collections::BTreeMap;

use async_trait::async_trait;
use classbook_application::{GroupRecord, GroupRepository};
use classbook_core::AppResult;
use tokio::sync::RwLock;

/// In-memory class group store ordered by id.
#[derive(Debug, Default)]
pub struct InMemoryGroupRepository {
    groups: RwLock<BTreeMap<String, GroupRecord>>,
}

impl InMemoryGroupRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn group_exists(&self, group_id: &str) -> AppResult<bool> {
        Ok(self.groups.read().await.contains_key(group_id.trim()))
    }

    async fn list_groups(&self) -> AppResult<Vec<GroupRecord>> {
        Ok(self.groups.read().await.values().cloned().collect())
    }

    async fn save_group(&self, group: GroupRecord) -> AppResult<()> {
        self.groups.write().await.insert(group.id.clone(), group);
        Ok(())
    }
}
