//! Studio services.

pub mod auth;
