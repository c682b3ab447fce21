//! User model and related functionality

use serde::{Deserialize, Serialize};

use super::session::SessionUser;

/// User entity as persisted under the users key
///
/// The password is kept in cleartext; this backend only simulates an API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Signups without a name store no `name` key at all
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
}

impl User {
    /// Public part of the user carried inside a session
    pub fn profile(&self) -> SessionUser {
        SessionUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Signup payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// User login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}
