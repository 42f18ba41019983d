use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One issued bearer token. The token string is the lookup key; expiry is
/// checked on every authenticated request.
#[derive(Debug, Clone)]
pub struct SessionEntity {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
