//! Studio-local models.

pub mod session;
pub mod staff;

pub use session::{CurrentStaff, session_keys};
pub use staff::Staff;
