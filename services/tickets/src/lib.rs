//! Mock ticket service
//!
//! List, create, update and remove tickets stored in the shared key-value
//! store, behind the same simulated network as the auth service.

pub mod api;
pub mod models;
pub mod repositories;

pub use api::{DEFAULT_LIST_FAILURE_RATE, TicketApi};
