//! Request-level error taxonomy.
//!
//! Every per-request failure is converted into a `{"detail": ...}` JSON body
//! at the endpoint boundary; nothing here is allowed to crash the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Auth errors
    #[error("Token missing")]
    TokenMissing,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token")]
    TokenInvalid,
    #[error("Invalid password")]
    InvalidPassword,
    #[error("Invalid credentials")]
    InvalidCredentials,

    // Malformed input
    #[error("userid & password required")]
    MissingCredentials,
    #[error("Invalid JSON")]
    InvalidJson,

    // Pairing launch side effect
    #[error("{0} not found")]
    ExecutableNotFound(String),
    #[error("Failed to start sync service: {0}")]
    LaunchFailed(String),

    // Generic
    #[error("DB error: {0}")]
    Db(#[from] DbError),
    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Self::TokenMissing
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::InvalidPassword
            | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::MissingCredentials | Self::InvalidJson => StatusCode::BAD_REQUEST,
            Self::ExecutableNotFound(_) => StatusCode::NOT_FOUND,
            Self::LaunchFailed(_) | Self::Db(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = Json(json!({ "detail": self.to_string() }));
        (self.status(), body).into_response()
    }
}
