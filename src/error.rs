//! Error taxonomy for the order API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadInput(String),

    #[error("Order not found")]
    OrderNotFound,

    #[error("Not authorized")]
    Unauthorized,

    #[error("Not authorized as an admin")]
    Forbidden,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(m) | Self::BadInput(m) => (StatusCode::BAD_REQUEST, m.clone()),
            Self::OrderNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            Self::Storage(detail) => {
                // Never leak storage details to the caller.
                tracing::error!(error = %detail, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };
        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Validation("x".into()).into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::OrderNotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Storage("db down".into()).into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
