use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use rand::RngCore;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    entities::sessions::SessionEntity, repositories::sessions::SessionRepository,
};

pub struct MemorySessions {
    sessions: RwLock<HashMap<String, SessionEntity>>,
}

impl MemorySessions {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

impl Default for MemorySessions {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for MemorySessions {
    async fn create(&self, user_id: Uuid, ttl: Duration) -> Result<SessionEntity> {
        let now = Utc::now();
        let entity = SessionEntity {
            token: Self::generate_token(),
            user_id,
            created_at: now,
            expires_at: now + ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(entity.token.clone(), entity.clone());
        Ok(entity)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<SessionEntity>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(token).cloned())
    }

    async fn revoke(&self, token: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn issued_tokens_resolve_to_their_user() {
        let repo = MemorySessions::new();
        let user_id = Uuid::new_v4();
        let session = repo.create(user_id, Duration::hours(1)).await.unwrap();

        let found = repo.find_by_token(&session.token).await.unwrap().unwrap();
        assert_eq!(found.user_id, user_id);
        assert!(found.expires_at > found.created_at);
    }

    #[tokio::test]
    async fn tokens_are_unique_per_session() {
        let repo = MemorySessions::new();
        let user_id = Uuid::new_v4();
        let first = repo.create(user_id, Duration::hours(1)).await.unwrap();
        let second = repo.create(user_id, Duration::hours(1)).await.unwrap();
        assert_ne!(first.token, second.token);
    }

    #[tokio::test]
    async fn revoked_tokens_no_longer_resolve() {
        let repo = MemorySessions::new();
        let session = repo
            .create(Uuid::new_v4(), Duration::hours(1))
            .await
            .unwrap();
        repo.revoke(&session.token).await.unwrap();
        assert!(repo.find_by_token(&session.token).await.unwrap().is_none());
    }
}
