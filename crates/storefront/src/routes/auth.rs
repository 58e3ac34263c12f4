//! Authentication route handlers.
//!
//! On login the anonymous cart (if any) merges into the shopper's cart,
//! so nothing added before signing in is lost.

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use golden_fig_commerce::db::CartRepository;

use crate::error::Result;
use crate::models::session::{guest_token, session_keys};
use crate::models::{CurrentUser, User};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration / login payload.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Register a new shopper and log them in.
#[instrument(skip(state, session, request))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool())
        .register(&request.email, &request.password)
        .await?;

    establish(&state, &session, &user).await?;
    Ok(Json(user))
}

/// Log an existing shopper in.
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool())
        .login(&request.email, &request.password)
        .await?;

    establish(&state, &session, &user).await?;
    Ok(Json(user))
}

/// Log out, dropping the authenticated identity but keeping the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(Json(serde_json::json!({ "logged_out": true })))
}

/// Establish the authenticated session: cycle the session id, store the
/// identity, and merge any guest cart into the user's.
async fn establish(state: &AppState, session: &Session, user: &User) -> Result<()> {
    // Merge before the identity flips so the guest cart is still findable.
    if let Some(token) = guest_token(session).await
        && let Err(e) = CartRepository::new(state.pool())
            .merge_guest_into_user(token, user.id)
            .await
    {
        // Losing the merge is an annoyance, not a login failure.
        warn!(error = %e, "guest cart merge failed");
    }

    session.cycle_id().await?;
    session
        .insert(
            session_keys::CURRENT_USER,
            CurrentUser {
                id: user.id,
                email: user.email.clone(),
            },
        )
        .await?;

    Ok(())
}
