use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use chrono::Utc;
use uuid::Uuid;

use crate::domain::repositories::sessions::SharedSessionRepository;

/// Authenticated caller, resolved from the bearer token via the session
/// store injected as a request extension.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub token: String,
}

pub fn extract_bearer_token(auth_str: &str) -> Result<&str, &'static str> {
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or("Invalid Authorization header format")?;
    if token.is_empty() {
        return Err("Invalid Authorization header format");
    }
    Ok(token)
}

pub async fn resolve_session(
    sessions: &SharedSessionRepository,
    token: &str,
) -> Result<AuthUser, String> {
    let session = sessions
        .find_by_token(token)
        .await
        .map_err(|err| format!("Session lookup failed: {}", err))?
        .ok_or_else(|| "Unknown session token".to_string())?;

    if session.expires_at <= Utc::now() {
        return Err("Session has expired".to_string());
    }

    Ok(AuthUser {
        user_id: session.user_id,
        token: token.to_string(),
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header".to_string(),
            ))?;

        let auth_str = auth_header.to_str().map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header".to_string(),
            )
        })?;

        let token = extract_bearer_token(auth_str)
            .map_err(|msg| (StatusCode::UNAUTHORIZED, msg.to_string()))?;

        let sessions = parts
            .extensions
            .get::<SharedSessionRepository>()
            .ok_or((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Session store is not configured".to_string(),
            ))?;

        resolve_session(sessions, token)
            .await
            .map_err(|msg| (StatusCode::UNAUTHORIZED, msg))
    }
}

#[cfg(test)]
mod tests;
