use std::collections::HashMap;

use async_trait::async_trait;
use classbook_application::{NewUser, UserRecord, UserRepository};
use classbook_core::{AppError, AppResult};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory user directory keyed by user id.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_identifier_or_email(
        &self,
        identifier: &str,
    ) -> AppResult<Option<UserRecord>> {
        let identifier = identifier.trim();
        let users = self.users.read().await;

        if let Some(user) = users.get(identifier) {
            return Ok(Some(user.clone()));
        }

        Ok(users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(identifier))
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|user| user.email.eq_ignore_ascii_case(email.trim())))
    }

    async fn create(&self, user: NewUser) -> AppResult<UserRecord> {
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::Conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        }

        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            full_name: user.full_name,
            email: user.email,
            password_hash: user.password_hash,
            group_id: user.group_id,
            role: user.role,
            subject: user.subject,
        };
        users.insert(record.id.clone(), record.clone());

        Ok(record)
    }

    async fn list_users(&self) -> AppResult<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = self.users.read().await.values().cloned().collect();
        users.sort_by(|left, right| left.email.cmp(&right.email));
        Ok(users)
    }
}
