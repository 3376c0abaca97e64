use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to create user: {0}")]
    UserCreationFailed(String),

    #[error("user not found")]
    UserNotFound,

    #[error("invalid password")]
    InvalidPassword,

    #[error("invalid refresh token")]
    InvalidRefreshToken,

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    TokenExpired,

    #[error("token signing failed: {0}")]
    TokenSigning(String),

    #[error("token store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Unknown email and wrong password deliberately share one body so a
            // caller cannot enumerate registered accounts. The variants stay
            // distinct for logs.
            AuthError::UserNotFound | AuthError::InvalidPassword => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            AuthError::InvalidRefreshToken => (
                StatusCode::UNAUTHORIZED,
                "Invalid refresh token".to_string(),
            ),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired".to_string()),
            AuthError::UserCreationFailed(_) => (
                StatusCode::BAD_GATEWAY,
                "Failed to register user".to_string(),
            ),
            AuthError::TokenSigning(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            AuthError::StoreUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable".to_string(),
            ),
            AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<redis::RedisError> for AuthError {
    fn from(err: redis::RedisError) -> Self {
        AuthError::StoreUnavailable(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        }
    }
}
