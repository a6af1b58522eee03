use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classbook_application::TokenRevocationList;
use classbook_core::AppResult;
use tokio::sync::RwLock;
use tracing::debug;

/// Process-local denylist of revoked token hashes.
///
/// Entries outlive their token by nothing: they are purged lazily on the
/// next revocation once the token would have expired anyway.
#[derive(Debug, Default)]
pub struct InMemoryTokenRevocationList {
    revoked: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryTokenRevocationList {
    /// Creates an empty denylist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of tracked hashes, expired ones included.
    pub async fn len(&self) -> usize {
        self.revoked.read().await.len()
    }

    /// Returns whether no hash is tracked.
    pub async fn is_empty(&self) -> bool {
        self.revoked.read().await.is_empty()
    }
}

#[async_trait]
impl TokenRevocationList for InMemoryTokenRevocationList {
    async fn revoke(&self, token_hash: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        let now = Utc::now();
        let mut revoked = self.revoked.write().await;

        let before = revoked.len();
        revoked.retain(|_, entry_expires_at| *entry_expires_at > now);
        let purged = before - revoked.len();
        if purged > 0 {
            debug!(purged, "purged expired revocations");
        }

        if expires_at > now {
            revoked.insert(token_hash.to_owned(), expires_at);
        }

        Ok(())
    }

    async fn is_revoked(&self, token_hash: &str, now: DateTime<Utc>) -> AppResult<bool> {
        Ok(self
            .revoked
            .read()
            .await
            .get(token_hash)
            .is_some_and(|expires_at| now < *expires_at))
    }
}
