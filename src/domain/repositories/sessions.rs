use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Duration;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::sessions::SessionEntity;

/// Shared handle injected into the request pipeline for the `AuthUser`
/// extractor.
pub type SharedSessionRepository = Arc<dyn SessionRepository + Send + Sync>;

#[async_trait]
#[automock]
pub trait SessionRepository {
    /// Issues a new opaque bearer token for `user_id`, valid for `ttl`.
    async fn create(&self, user_id: Uuid, ttl: Duration) -> Result<SessionEntity>;

    async fn find_by_token(&self, token: &str) -> Result<Option<SessionEntity>>;

    async fn revoke(&self, token: &str) -> Result<()>;
}
