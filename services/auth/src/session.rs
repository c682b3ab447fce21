//! In-memory session slot owned by the application root
//!
//! The slot is initialized once from the persisted session and afterwards only
//! changes through the auth operations below, or when a route guard resyncs it.

use common::ApiResult;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::{
    api::AuthApi,
    models::{LoginCredentials, NewUser, Session},
};

/// Session context shared between the router and the views
#[derive(Debug, Clone)]
pub struct SessionContext {
    api: AuthApi,
    slot: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    /// Create a session context seeded from the persisted session
    pub fn new(api: AuthApi) -> Self {
        let initial = api.get_session();
        info!(
            "Session context initialized (authenticated: {})",
            initial.is_some()
        );

        Self {
            api,
            slot: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn api(&self) -> &AuthApi {
        &self.api
    }

    /// Snapshot of the current session
    pub async fn session(&self) -> Option<Session> {
        self.slot.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.slot.read().await.is_some()
    }

    pub async fn set_session(&self, session: Option<Session>) {
        *self.slot.write().await = session;
    }

    pub async fn clear(&self) {
        self.set_session(None).await;
    }

    /// Log in and remember the new session
    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<Session> {
        let session = self.api.login(credentials).await?;
        self.set_session(Some(session.clone())).await;
        Ok(session)
    }

    /// Sign up and remember the new session
    pub async fn signup(&self, payload: &NewUser) -> ApiResult<Session> {
        let session = self.api.signup(payload).await?;
        self.set_session(Some(session.clone())).await;
        Ok(session)
    }

    /// Log out and forget the session
    pub async fn logout(&self) -> ApiResult<()> {
        self.api.logout().await?;
        self.clear().await;
        Ok(())
    }
}
