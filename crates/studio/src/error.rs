//! Unified error handling for the studio, with Sentry integration.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use golden_fig_commerce::coupon::InvalidCoupon;
use golden_fig_commerce::db::RepositoryError;
use golden_fig_commerce::orders::OrderError;

use crate::services::auth::StaffAuthError;

/// Application-level error type for the studio.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Order lifecycle operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Coupon creation input rejected.
    #[error("Invalid coupon: {0}")]
    CouponRule(#[from] InvalidCoupon),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] StaffAuthError),

    /// Session store failure.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Database(_) | Self::Internal(_) | Self::Session(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(RepositoryError::NotFound)
            | Self::Order(OrderError::Repository(RepositoryError::NotFound)) => {
                StatusCode::NOT_FOUND
            }
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) | Self::Session(_) | Self::Order(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::CouponRule(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Auth(err) => match err {
                StaffAuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                StaffAuthError::WeakPassword(_) | StaffAuthError::InvalidEmail(_) => {
                    StatusCode::BAD_REQUEST
                }
                StaffAuthError::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let message = match &self {
            Self::Database(RepositoryError::NotFound)
            | Self::Order(OrderError::Repository(RepositoryError::NotFound)) => {
                "not found".to_string()
            }
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Database(_) | Self::Internal(_) | Self::Session(_) | Self::Order(_) => {
                "Internal server error".to_string()
            }
            Self::Auth(err) => match err {
                StaffAuthError::InvalidCredentials => "Invalid credentials".to_string(),
                StaffAuthError::WeakPassword(msg) => msg.clone(),
                StaffAuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                StaffAuthError::Repository(RepositoryError::Conflict(msg)) => msg.clone(),
                _ => "Authentication error".to_string(),
            },
            _ => self.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let status = AppError::NotFound("x".into()).into_response().status();
        assert_eq!(status, StatusCode::NOT_FOUND);

        let status = AppError::CouponRule(InvalidCoupon::PercentageOutOfRange)
            .into_response()
            .status();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let status = AppError::Auth(StaffAuthError::InvalidCredentials)
            .into_response()
            .status();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
