use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorResult;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    UpstreamError(String),
    #[error("{0}")]
    FetchError(String),
    #[error("{0}")]
    TranscodeError(String),
    #[error("{0}")]
    StoreError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RelayError {
    pub fn is_validation(&self) -> bool {
        matches!(self, RelayError::ValidationError(_))
    }
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::ValidationError(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResult {
            error: self.to_string(),
        })
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
