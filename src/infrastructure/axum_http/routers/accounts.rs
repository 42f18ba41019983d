use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::{error, info};

use crate::{
    application::usecases::accounts::{
        AccountError, AccountsUseCase, LoginModel, RegisterUserModel,
    },
    domain::repositories::{
        credit_ledger::CreditLedger, sessions::SessionRepository, users::UserRepository,
    },
    infrastructure::{
        axum_http::auth::AuthUser,
        memory::repositories::{
            credit_ledger::MemoryCreditLedger, sessions::MemorySessions, users::MemoryUsers,
        },
    },
};

pub fn auth_routes(
    users: Arc<MemoryUsers>,
    sessions: Arc<MemorySessions>,
    ledger: Arc<MemoryCreditLedger>,
    initial_grant: i64,
) -> Router {
    let usecase = Arc::new(AccountsUseCase::new(users, sessions, ledger, initial_grant));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .with_state(usecase)
}

pub fn credit_routes(
    users: Arc<MemoryUsers>,
    sessions: Arc<MemorySessions>,
    ledger: Arc<MemoryCreditLedger>,
    initial_grant: i64,
) -> Router {
    let usecase = Arc::new(AccountsUseCase::new(users, sessions, ledger, initial_grant));

    Router::new()
        .route("/balance", get(balance))
        .with_state(usecase)
}

pub async fn register<U, S, L>(
    State(usecase): State<Arc<AccountsUseCase<U, S, L>>>,
    Json(payload): Json<RegisterUserModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    L: CreditLedger + Send + Sync + 'static,
{
    info!(email = %payload.email, "accounts: register request received");
    match usecase.register(payload).await {
        Ok(dto) => (StatusCode::CREATED, Json(dto)).into_response(),
        Err(err) => {
            if matches!(err, AccountError::Internal(_)) {
                error!(error = %err, "accounts: registration failed");
            }
            err.into_response()
        }
    }
}

pub async fn login<U, S, L>(
    State(usecase): State<Arc<AccountsUseCase<U, S, L>>>,
    Json(payload): Json<LoginModel>,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    L: CreditLedger + Send + Sync + 'static,
{
    match usecase.login(payload).await {
        Ok(dto) => Json(dto).into_response(),
        Err(err) => {
            if matches!(err, AccountError::Internal(_)) {
                error!(error = %err, "accounts: login failed");
            }
            err.into_response()
        }
    }
}

pub async fn logout<U, S, L>(
    State(usecase): State<Arc<AccountsUseCase<U, S, L>>>,
    auth_user: AuthUser,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    L: CreditLedger + Send + Sync + 'static,
{
    match usecase.logout(&auth_user.token).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            error!(user_id = %auth_user.user_id, error = %err, "accounts: logout failed");
            err.into_response()
        }
    }
}

pub async fn balance<U, S, L>(
    State(usecase): State<Arc<AccountsUseCase<U, S, L>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
    L: CreditLedger + Send + Sync + 'static,
{
    match usecase.balance(user_id).await {
        Ok(dto) => Json(dto).into_response(),
        Err(err) => {
            error!(%user_id, error = %err, "accounts: balance query failed");
            err.into_response()
        }
    }
}
