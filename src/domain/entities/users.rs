use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::value_objects::enums::plan_tiers::PlanTier;

#[derive(Debug, Clone)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub plan: PlanTier,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RegisterUserEntity {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub plan: PlanTier,
}
