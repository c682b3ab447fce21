//! User repository for store operations

use common::{
    ApiError, ApiResult, BackendContext,
    store::{read_json_list, write_json},
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::{NewUser, User};

/// Storage key holding the JSON array of users
pub const USERS_KEY: &str = "ticketapp_users";

/// User repository
#[derive(Debug, Clone)]
pub struct UserRepository {
    ctx: BackendContext,
    write_lock: Arc<Mutex<()>>,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(ctx: BackendContext) -> Self {
        Self {
            ctx,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// All registered users
    pub fn all(&self) -> ApiResult<Vec<User>> {
        Ok(read_json_list(self.ctx.store.as_ref(), USERS_KEY)?)
    }

    /// Create a new user, rejecting duplicate emails
    pub async fn create(&self, new_user: &NewUser) -> ApiResult<User> {
        info!("Creating new user: {}", new_user.email);

        let _guard = self.write_lock.lock().await;
        let mut users = self.all()?;

        if users.iter().any(|u| u.email == new_user.email) {
            return Err(ApiError::Conflict("Email already exists".to_string()));
        }

        let id = self
            .ctx
            .next_id("u_", |id| users.iter().any(|u| u.id == id));
        let user = User {
            id,
            name: new_user.name.clone(),
            email: new_user.email.clone(),
            password: new_user.password.clone(),
        };

        users.push(user.clone());
        write_json(self.ctx.store.as_ref(), USERS_KEY, &users)?;

        Ok(user)
    }

    /// Find the user matching both email and password exactly
    pub fn find_by_credentials(&self, email: &str, password: &str) -> ApiResult<Option<User>> {
        Ok(self
            .all()?
            .into_iter()
            .find(|u| u.email == email && u.password == password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::clock::ManualClock;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".to_string(),
            email: email.to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() -> ApiResult<()> {
        let repo = UserRepository::new(BackendContext::in_memory(1, ManualClock::new(500)));
        let user = repo.create(&new_user("ada@example.com")).await?;
        assert_eq!(user.id, "u_500");

        assert_eq!(repo.all()?, vec![user.clone()]);
        assert_eq!(
            repo.find_by_credentials("ada@example.com", "secret")?,
            Some(user)
        );
        assert_eq!(repo.find_by_credentials("ada@example.com", "Secret")?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_same_millisecond_users_get_distinct_ids() -> ApiResult<()> {
        let repo = UserRepository::new(BackendContext::in_memory(1, ManualClock::new(7)));
        let a = repo.create(&new_user("a@example.com")).await?;
        let b = repo.create(&new_user("b@example.com")).await?;
        assert_eq!(a.id, "u_7");
        assert_eq!(b.id, "u_8");
        Ok(())
    }
}
