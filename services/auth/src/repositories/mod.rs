//! Repositories over the key-value store

pub mod session;
pub mod user;

pub use session::SessionRepository;
pub use user::UserRepository;
