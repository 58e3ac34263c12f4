//! Staff authentication route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::models::{CurrentStaff, Staff, session_keys};
use crate::services::auth::StaffAuthService;
use crate::state::AppState;

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Log a staff member in.
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Staff>> {
    let staff = StaffAuthService::new(state.pool())
        .login(&request.email, &request.password)
        .await?;

    session.cycle_id().await?;
    session
        .insert(
            session_keys::CURRENT_STAFF,
            CurrentStaff {
                id: staff.id,
                email: staff.email.clone(),
                name: staff.name.clone(),
            },
        )
        .await?;

    Ok(Json(staff))
}

/// Log the staff member out.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    session
        .remove::<CurrentStaff>(session_keys::CURRENT_STAFF)
        .await?;
    Ok(Json(serde_json::json!({ "logged_out": true })))
}
