use std::sync::Arc;

use anyhow::anyhow;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    entities::users::RegisterUserEntity,
    repositories::{
        credit_ledger::CreditLedger, sessions::SessionRepository, users::UserRepository,
    },
    value_objects::enums::plan_tiers::PlanTier,
};

const SESSION_TTL_HOURS: i64 = 72;
const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),
    #[error("email is already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserModel {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginModel {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub plan: PlanTier,
    pub balance: i64,
}

#[derive(Debug, Serialize)]
pub struct SessionDto {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BalanceDto {
    pub balance: i64,
}

/// Registration, login and balance queries. Registration opens the user's
/// credit account with the configured initial grant.
pub struct AccountsUseCase<U, S, L>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    L: CreditLedger + Send + Sync + 'static,
{
    users: Arc<U>,
    sessions: Arc<S>,
    ledger: Arc<L>,
    initial_grant: i64,
}

impl<U, S, L> AccountsUseCase<U, S, L>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    L: CreditLedger + Send + Sync + 'static,
{
    pub fn new(users: Arc<U>, sessions: Arc<S>, ledger: Arc<L>, initial_grant: i64) -> Self {
        Self {
            users,
            sessions,
            ledger,
            initial_grant,
        }
    }

    pub async fn register(&self, model: RegisterUserModel) -> Result<UserDto, AccountError> {
        let email = model.email.trim().to_lowercase();
        let username = model.username.trim().to_string();
        if email.is_empty() || !email.contains('@') {
            return Err(AccountError::Validation(
                "a valid email address is required".to_string(),
            ));
        }
        if username.is_empty() {
            return Err(AccountError::Validation("username is required".to_string()));
        }
        if model.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AccountError::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_CHARS
            )));
        }

        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(AccountError::Internal)?
            .is_some()
        {
            return Err(AccountError::EmailTaken);
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(model.password.as_bytes(), &salt)
            .map_err(|err| AccountError::Internal(anyhow!("password hashing failed: {}", err)))?
            .to_string();

        let user = self
            .users
            .register(RegisterUserEntity {
                email,
                username,
                password_hash,
                plan: PlanTier::Free,
            })
            .await
            .map_err(AccountError::Internal)?;

        self.ledger
            .open_account(user.id, self.initial_grant)
            .await
            .map_err(|err| AccountError::Internal(anyhow::Error::new(err)))?;

        info!(user_id = %user.id, grant = self.initial_grant, "accounts: user registered");

        Ok(UserDto {
            user_id: user.id,
            email: user.email,
            username: user.username,
            plan: user.plan,
            balance: self.initial_grant,
        })
    }

    pub async fn login(&self, model: LoginModel) -> Result<SessionDto, AccountError> {
        let email = model.email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(AccountError::Internal)?
            .ok_or(AccountError::InvalidCredentials)?;

        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|err| AccountError::Internal(anyhow!("stored hash is invalid: {}", err)))?;
        Argon2::default()
            .verify_password(model.password.as_bytes(), &parsed_hash)
            .map_err(|_| AccountError::InvalidCredentials)?;

        let session = self
            .sessions
            .create(user.id, Duration::hours(SESSION_TTL_HOURS))
            .await
            .map_err(AccountError::Internal)?;

        info!(user_id = %user.id, "accounts: session issued");

        Ok(SessionDto {
            token: session.token,
            expires_at: session.expires_at,
        })
    }

    pub async fn logout(&self, token: &str) -> Result<(), AccountError> {
        self.sessions
            .revoke(token)
            .await
            .map_err(AccountError::Internal)
    }

    pub async fn balance(&self, user_id: Uuid) -> Result<BalanceDto, AccountError> {
        let balance = self
            .ledger
            .balance(user_id)
            .await
            .map_err(|err| AccountError::Internal(anyhow::Error::new(err)))?;
        Ok(BalanceDto { balance })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::repositories::{
        credit_ledger::MemoryCreditLedger, sessions::MemorySessions, users::MemoryUsers,
    };

    fn usecase() -> AccountsUseCase<MemoryUsers, MemorySessions, MemoryCreditLedger> {
        AccountsUseCase::new(
            Arc::new(MemoryUsers::new()),
            Arc::new(MemorySessions::new()),
            Arc::new(MemoryCreditLedger::new()),
            20,
        )
    }

    fn register_model(email: &str) -> RegisterUserModel {
        RegisterUserModel {
            email: email.to_string(),
            username: "harborist".to_string(),
            password: "correct horse battery".to_string(),
        }
    }

    #[tokio::test]
    async fn registration_grants_initial_credits() {
        let usecase = usecase();
        let user = usecase.register(register_model("a@example.com")).await.unwrap();
        assert_eq!(user.balance, 20);
        assert_eq!(user.plan, PlanTier::Free);

        let balance = usecase.balance(user.user_id).await.unwrap();
        assert_eq!(balance.balance, 20);
    }

    #[tokio::test]
    async fn register_then_login_round_trips() {
        let usecase = usecase();
        usecase.register(register_model("a@example.com")).await.unwrap();

        let session = usecase
            .login(LoginModel {
                email: "A@Example.com".to_string(),
                password: "correct horse battery".to_string(),
            })
            .await
            .unwrap();
        assert!(!session.token.is_empty());
        assert!(session.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let usecase = usecase();
        usecase.register(register_model("a@example.com")).await.unwrap();
        assert!(matches!(
            usecase.register(register_model("a@example.com")).await,
            Err(AccountError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let usecase = usecase();
        usecase.register(register_model("a@example.com")).await.unwrap();

        let result = usecase
            .login(LoginModel {
                email: "a@example.com".to_string(),
                password: "not the password".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AccountError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn unknown_email_is_invalid_credentials() {
        let usecase = usecase();
        let result = usecase
            .login(LoginModel {
                email: "ghost@example.com".to_string(),
                password: "whatever password".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AccountError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn weak_passwords_and_bad_emails_are_rejected() {
        let usecase = usecase();

        let mut weak = register_model("a@example.com");
        weak.password = "short".to_string();
        assert!(matches!(
            usecase.register(weak).await,
            Err(AccountError::Validation(_))
        ));

        let mut bad_email = register_model("not-an-email");
        bad_email.email = "not-an-email".to_string();
        assert!(matches!(
            usecase.register(bad_email).await,
            Err(AccountError::Validation(_))
        ));
    }
}
