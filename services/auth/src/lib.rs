//! Mock authentication service
//!
//! Signup, login and logout over the shared key-value store, plus the
//! session context the application root hands to its router.

pub mod api;
pub mod models;
pub mod repositories;
pub mod session;
pub mod validation;

pub use api::{AuthApi, DEFAULT_SESSION_TTL};
pub use session::SessionContext;
