//! Session-related types.
//!
//! Types stored in the session for authentication state, plus the owner
//! resolution used by every cart/wishlist/checkout handler: a logged-in
//! shopper acts as their user id, an anonymous one as a session-scoped
//! guest token minted on first use.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use golden_fig_commerce::models::Owner;
use golden_fig_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in shopper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

/// Session keys for authentication and ownership data.
pub mod session_keys {
    /// Key for storing the current logged-in shopper.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the anonymous guest token owning carts and wishlists.
    pub const GUEST_TOKEN: &str = "guest_token";
}

/// Get the logged-in shopper from the session, if any.
pub async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Resolve the commerce owner for this session.
///
/// Logged-in shoppers own by user id. Anonymous shoppers own by a guest
/// token minted here on first use and kept in the session.
///
/// # Errors
///
/// Returns the session store error if the guest token cannot be persisted.
pub async fn resolve_owner(session: &Session) -> Result<Owner, tower_sessions::session::Error> {
    if let Some(user) = current_user(session).await {
        return Ok(Owner::User(user.id));
    }

    if let Some(token) = session
        .get::<Uuid>(session_keys::GUEST_TOKEN)
        .await
        .ok()
        .flatten()
    {
        return Ok(Owner::Guest(token));
    }

    let token = Uuid::new_v4();
    session.insert(session_keys::GUEST_TOKEN, token).await?;
    Ok(Owner::Guest(token))
}

/// The guest token for this session, if one was ever minted.
pub async fn guest_token(session: &Session) -> Option<Uuid> {
    session
        .get::<Uuid>(session_keys::GUEST_TOKEN)
        .await
        .ok()
        .flatten()
}
