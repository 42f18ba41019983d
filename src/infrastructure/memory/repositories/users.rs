use std::collections::HashMap;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    entities::users::{RegisterUserEntity, UserEntity},
    repositories::users::UserRepository,
};

pub struct MemoryUsers {
    users: RwLock<HashMap<Uuid, UserEntity>>,
}

impl MemoryUsers {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryUsers {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn register(&self, register_entity: RegisterUserEntity) -> Result<UserEntity> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|user| user.email == register_entity.email)
        {
            bail!("email {} is already registered", register_entity.email);
        }

        let now = Utc::now();
        let entity = UserEntity {
            id: Uuid::new_v4(),
            email: register_entity.email,
            username: register_entity.username,
            password_hash: register_entity.password_hash,
            plan: register_entity.plan,
            created_at: now,
            updated_at: now,
        };
        users.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::enums::plan_tiers::PlanTier;

    fn register_entity(email: &str) -> RegisterUserEntity {
        RegisterUserEntity {
            email: email.to_string(),
            username: "harborist".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            plan: PlanTier::Free,
        }
    }

    #[tokio::test]
    async fn registered_users_are_found_by_id_and_email() {
        let repo = MemoryUsers::new();
        let user = repo.register(register_entity("a@example.com")).await.unwrap();

        assert!(repo.find_by_id(user.id).await.unwrap().is_some());
        let by_email = repo
            .find_by_email("a@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[tokio::test]
    async fn duplicate_emails_are_rejected() {
        let repo = MemoryUsers::new();
        repo.register(register_entity("a@example.com")).await.unwrap();
        assert!(repo.register(register_entity("a@example.com")).await.is_err());
    }
}
