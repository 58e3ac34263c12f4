//! Shopper account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use golden_fig_core::{Email, UserId};

/// A registered shopper.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
