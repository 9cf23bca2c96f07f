//! The `error` module defines the error types used across `chathub`.
//!
//! Each seam has its own enum (`HubError`, `AuthError`, `StoreError`) and the
//! top-level [`Error`] wraps them so handlers can use `?` freely. [`Error`]
//! also knows how to turn itself into an HTTP response: the client only ever
//! sees a short, stable message. The full cause rides along as an
//! [`ErrorCause`] response extension for the request log.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by the hub to callers of its control API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    #[error("room `{0}` not found")]
    RoomNotFound(String),
    #[error("room `{0}` already exists")]
    RoomAlreadyExists(String),
    #[error("hub control loop is not running")]
    Closed,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("access token not provided")]
    MissingToken,
    #[error("refresh token not provided")]
    MissingRefreshToken,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token expired")]
    TokenExpired,
    #[error("unsupported token signing algorithm")]
    UnsupportedAlgorithm,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("refresh session not found")]
    SessionNotFound,
    #[error("refresh session revoked")]
    SessionRevoked,
    #[error("refresh session expired")]
    SessionExpired,
    #[error("secret key must be at least {min} bytes, got {actual}")]
    KeyTooShort { min: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage failure: {0}")]
    Sled(#[from] sled::Error),
    #[error("corrupt record: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("user with email `{0}` already exists")]
    UserExists(String),
    #[error("user with email `{0}` not found")]
    UserNotFound(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Hub(#[from] HubError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Auth(AuthError::KeyTooShort { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Auth(_) => StatusCode::UNAUTHORIZED,
            Error::Hub(HubError::RoomNotFound(_)) => StatusCode::NOT_FOUND,
            Error::Hub(HubError::RoomAlreadyExists(_)) => StatusCode::CONFLICT,
            Error::Store(StoreError::UserNotFound(_)) => StatusCode::NOT_FOUND,
            Error::Store(StoreError::UserExists(_)) => StatusCode::CONFLICT,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message sent back to the client. Server-side failures are
    /// collapsed into a generic string.
    pub fn client_message(&self) -> String {
        match self {
            Error::Auth(AuthError::InvalidCredentials) => "invalid credentials".to_string(),
            Error::Auth(AuthError::KeyTooShort { .. }) => "internal server error".to_string(),
            Error::Auth(e @ AuthError::MissingRefreshToken) => e.to_string(),
            Error::Auth(_) => "authentication required".to_string(),
            Error::Hub(HubError::Closed) => "internal server error".to_string(),
            Error::Hub(e) => e.to_string(),
            Error::Store(e @ (StoreError::UserExists(_) | StoreError::UserNotFound(_))) => {
                e.to_string()
            }
            Error::BadRequest(msg) => msg.clone(),
            _ => "internal server error".to_string(),
        }
    }
}

/// Attached to error responses so request logging can name the cause.
#[derive(Debug, Clone)]
pub struct ErrorCause(pub String);

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let mut response = (
            self.status(),
            Json(ErrorBody {
                error: self.client_message(),
            }),
        )
            .into_response();
        response
            .extensions_mut()
            .insert(ErrorCause(self.to_string()));
        response
    }
}
