use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::usecases::{accounts::AccountError, generations::GenerationError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<i64>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: String) -> Self {
        Self {
            code: status.as_u16(),
            message,
            required: None,
            available: None,
        }
    }
}

impl IntoResponse for GenerationError {
    fn into_response(self) -> Response {
        let (status, required, available) = match &self {
            GenerationError::Validation(_) => (StatusCode::BAD_REQUEST, None, None),
            GenerationError::InsufficientCredits {
                required,
                available,
            } => (
                StatusCode::PAYMENT_REQUIRED,
                Some(*required),
                Some(*available),
            ),
            GenerationError::NotFound => (StatusCode::NOT_FOUND, None, None),
            GenerationError::AccessDenied => (StatusCode::FORBIDDEN, None, None),
            GenerationError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, None, None),
        };

        // Internal detail stays out of client responses.
        let message = match &self {
            GenerationError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            code: status.as_u16(),
            message,
            required,
            available,
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let status = match &self {
            AccountError::Validation(_) => StatusCode::BAD_REQUEST,
            AccountError::EmailTaken => StatusCode::CONFLICT,
            AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AccountError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            AccountError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(ErrorResponse::new(status, message))).into_response()
    }
}
