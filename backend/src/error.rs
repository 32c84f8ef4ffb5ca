use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use santa_core::PairingError;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid admin password")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Pairing(#[from] PairingError),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("export error: {0}")]
    Export(#[from] csv::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Pairing(err) => match err {
                PairingError::InsufficientParticipants { .. }
                | PairingError::DuplicateParticipant
                | PairingError::SelfAssignment => StatusCode::BAD_REQUEST,
                PairingError::AlreadyRevealed => StatusCode::CONFLICT,
                PairingError::Exhausted => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Storage(_) | ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}
