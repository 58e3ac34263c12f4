//! Staff account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use golden_fig_core::{Email, StaffId};

/// A staff member with studio access.
#[derive(Debug, Clone, Serialize)]
pub struct Staff {
    pub id: StaffId,
    pub email: Email,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
