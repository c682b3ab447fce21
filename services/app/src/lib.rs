//! Ticket app: settings, routing and the application root
//!
//! The `ticketapp` binary drives these from the command line in place of a
//! browser UI.

pub mod config;
pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{Navigation, RedirectReason, RouteGuard};
pub use routes::Route;
pub use state::AppState;
