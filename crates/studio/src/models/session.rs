//! Session-related types for the studio.

use serde::{Deserialize, Serialize};

use golden_fig_core::{Email, StaffId};

/// Session-stored staff identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentStaff {
    pub id: StaffId,
    pub email: Email,
    pub name: String,
}

/// Session keys for studio authentication data.
pub mod session_keys {
    /// Key for storing the current logged-in staff member.
    pub const CURRENT_STAFF: &str = "current_staff";
}
