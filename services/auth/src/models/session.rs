//! Session model and related functionality

use serde::{Deserialize, Serialize};

/// User identity embedded in a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// The single active session of a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
    /// Expiry as epoch milliseconds
    pub exp: i64,
}

impl Session {
    /// A session is expired once the clock reaches `exp`
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        self.exp <= now_millis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(exp: i64) -> Session {
        Session {
            token: "sess_abc".to_string(),
            user: SessionUser {
                id: "u_1".to_string(),
                name: "A".to_string(),
                email: "a@example.com".to_string(),
            },
            exp,
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let s = session(1_000);
        assert!(!s.is_expired_at(999));
        assert!(s.is_expired_at(1_000));
        assert!(s.is_expired_at(1_001));
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(session(5)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "token": "sess_abc",
                "user": { "id": "u_1", "name": "A", "email": "a@example.com" },
                "exp": 5
            })
        );
    }
}
