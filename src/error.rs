use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::store::StoreError;

/// Error returned by services and handlers.
///
/// Auth failures intentionally share their messages: the caller learns that
/// authentication failed, not which check rejected it.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("email already in use")]
    DuplicateEmail,
    #[error("nfc card id already registered")]
    DuplicateCardId,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("user not found")]
    UserNotFound,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateEmail | AppError::DuplicateCardId => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::UserNotFound => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::DuplicateEmail => "Email already in use".into(),
            AppError::DuplicateCardId => "NFC card already registered".into(),
            AppError::InvalidCredentials => "Invalid credentials".into(),
            AppError::InvalidToken | AppError::UserNotFound => {
                "Could not validate credentials".into()
            }
            AppError::Validation(msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AppError::DuplicateEmail,
            StoreError::DuplicateCardId => AppError::DuplicateCardId,
            StoreError::UserNotFound(_) => AppError::UserNotFound,
            StoreError::Database(e) => AppError::Internal(anyhow::Error::new(e).context("database")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let AppError::Internal(e) = &self {
            error!(error = ?e, "internal error");
        }
        let body = Json(json!({ "detail": self.public_message() }));
        let mut res = (status, body).into_response();
        if matches!(self, AppError::InvalidToken | AppError::UserNotFound) {
            res.headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        res
    }
}
