//! Staff authentication extractor.

use axum::Json;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentStaff, session_keys};

/// Extractor that requires a logged-in staff member.
///
/// Returns 401 when no staff session exists.
pub struct RequireStaffAuth(pub CurrentStaff);

/// Rejection when staff authentication is required but missing.
pub struct StaffAuthRejection;

impl IntoResponse for StaffAuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "staff authentication required" })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireStaffAuth
where
    S: Send + Sync,
{
    type Rejection = StaffAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(StaffAuthRejection)?;

        let staff: CurrentStaff = session
            .get(session_keys::CURRENT_STAFF)
            .await
            .ok()
            .flatten()
            .ok_or(StaffAuthRejection)?;

        Ok(Self(staff))
    }
}
