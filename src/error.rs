use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Failures raised by a leave-request store backend.
#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
    #[display(fmt = "store lock poisoned")]
    Poisoned,
    #[display(fmt = "corrupt record {}: {}", id, reason)]
    Corrupt { id: String, reason: String },
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

#[derive(Debug, Display)]
pub enum LeaveError {
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "{}", _0)]
    InvalidState(String),
    #[display(fmt = "storage failure: {}", _0)]
    Storage(StoreError),
}

impl std::error::Error for LeaveError {}

impl From<StoreError> for LeaveError {
    fn from(e: StoreError) -> Self {
        tracing::error!(error = %e, "Leave store operation failed");
        LeaveError::Storage(e)
    }
}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::Validation(_) => StatusCode::BAD_REQUEST,
            LeaveError::NotFound(_) => StatusCode::NOT_FOUND,
            LeaveError::InvalidState(_) => StatusCode::CONFLICT,
            LeaveError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // storage details stay in the log
        let message = match self {
            LeaveError::Storage(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

pub type LeaveResult<T> = Result<T, LeaveError>;
