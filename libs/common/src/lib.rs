//! Common library for the ticket app mock backend
//!
//! This crate provides the pieces shared by the auth and ticket services:
//! the key-value store contract and its backends, the error taxonomy, and the
//! injectable clock and network simulation.

pub mod cache;
pub mod clock;
pub mod context;
pub mod error;
pub mod network;
pub mod store;

pub use context::BackendContext;
pub use error::{ApiError, ApiResult, ErrorKind, StoreError, StoreResult};
