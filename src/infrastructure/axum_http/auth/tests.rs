use super::*;
use std::sync::Arc;

use chrono::Duration;

use crate::{
    domain::repositories::sessions::SessionRepository,
    infrastructure::memory::repositories::sessions::MemorySessions,
};

fn shared_sessions() -> (Arc<MemorySessions>, SharedSessionRepository) {
    let sessions = Arc::new(MemorySessions::new());
    let shared: SharedSessionRepository = sessions.clone();
    (sessions, shared)
}

#[test]
fn bearer_tokens_are_extracted() {
    assert_eq!(extract_bearer_token("Bearer abc123").unwrap(), "abc123");
}

#[test]
fn malformed_authorization_values_are_rejected() {
    for raw in ["abc123", "bearer abc123", "Bearer ", "Basic abc123"] {
        assert!(extract_bearer_token(raw).is_err(), "{:?} should fail", raw);
    }
}

#[tokio::test]
async fn valid_sessions_resolve_to_their_user() {
    let (sessions, shared) = shared_sessions();
    let user_id = uuid::Uuid::new_v4();
    let session = sessions.create(user_id, Duration::hours(1)).await.unwrap();

    let auth_user = resolve_session(&shared, &session.token).await.unwrap();
    assert_eq!(auth_user.user_id, user_id);
    assert_eq!(auth_user.token, session.token);
}

#[tokio::test]
async fn unknown_tokens_are_rejected() {
    let (_sessions, shared) = shared_sessions();
    let err = resolve_session(&shared, "no-such-token").await.unwrap_err();
    assert!(err.contains("Unknown session token"));
}

#[tokio::test]
async fn expired_sessions_are_rejected() {
    let (sessions, shared) = shared_sessions();
    let session = sessions
        .create(uuid::Uuid::new_v4(), Duration::hours(-1))
        .await
        .unwrap();

    let err = resolve_session(&shared, &session.token).await.unwrap_err();
    assert!(err.contains("expired"));
}

#[tokio::test]
async fn revoked_sessions_are_rejected() {
    let (sessions, shared) = shared_sessions();
    let session = sessions
        .create(uuid::Uuid::new_v4(), Duration::hours(1))
        .await
        .unwrap();
    sessions.revoke(&session.token).await.unwrap();

    assert!(resolve_session(&shared, &session.token).await.is_err());
}
