//! Mock authentication API
//!
//! Every operation waits for the simulated round trip before touching the
//! store, like a call to a remote auth service would.

use common::{ApiError, ApiResult, BackendContext};
use std::time::Duration;
use tracing::{info, warn};

use crate::{
    models::{LoginCredentials, NewUser, Session, User},
    repositories::{SessionRepository, UserRepository},
    validation::{validate_email, validate_password},
};

/// Lifetime of a freshly issued session
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24);

const TOKEN_PREFIX: &str = "sess_";
const TOKEN_LEN: usize = 11;

/// Signup, login and logout against the key-value store
#[derive(Debug, Clone)]
pub struct AuthApi {
    ctx: BackendContext,
    users: UserRepository,
    sessions: SessionRepository,
    session_ttl: Duration,
}

impl AuthApi {
    pub fn new(ctx: BackendContext) -> Self {
        Self {
            users: UserRepository::new(ctx.clone()),
            sessions: SessionRepository::new(ctx.clone()),
            ctx,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    pub fn with_session_ttl(mut self, session_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    /// Register a user and log them in
    pub async fn signup(&self, payload: &NewUser) -> ApiResult<Session> {
        self.ctx.network.round_trip().await;
        info!("Signup attempt for: {}", payload.email);

        validate_email(&payload.email).map_err(ApiError::Validation)?;
        validate_password(&payload.password).map_err(ApiError::Validation)?;

        let user = self.users.create(payload).await?;
        self.issue_session(&user)
    }

    /// Log in with email and password
    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<Session> {
        self.ctx.network.round_trip().await;
        info!("Login attempt for: {}", credentials.email);

        validate_email(&credentials.email).map_err(ApiError::Validation)?;

        let user = self
            .users
            .find_by_credentials(&credentials.email, &credentials.password)?
            .ok_or_else(|| {
                warn!("Rejected credentials for: {}", credentials.email);
                ApiError::Auth("Invalid credentials".to_string())
            })?;

        self.issue_session(&user)
    }

    /// Drop the persisted session
    pub async fn logout(&self) -> ApiResult<()> {
        self.ctx.network.round_trip().await;
        info!("Logout request");

        self.sessions.clear()
    }

    /// Currently persisted session, if any
    ///
    /// Local read without simulated latency. Missing, undecodable or unreadable
    /// sessions all come back as `None`.
    pub fn get_session(&self) -> Option<Session> {
        self.sessions.load()
    }

    /// Remove the persisted session without a simulated round trip
    pub fn clear_session(&self) -> ApiResult<()> {
        self.sessions.clear()
    }

    /// Current time according to the backend clock
    pub fn now_millis(&self) -> i64 {
        self.ctx.now_millis()
    }

    fn issue_session(&self, user: &User) -> ApiResult<Session> {
        let ttl = i64::try_from(self.session_ttl.as_millis()).unwrap_or(i64::MAX);
        let session = Session {
            token: format!(
                "{}{}",
                TOKEN_PREFIX,
                self.ctx.network.random_token(TOKEN_LEN)
            ),
            user: user.profile(),
            exp: self.ctx.now_millis().saturating_add(ttl),
        };

        self.sessions.save(&session)?;
        Ok(session)
    }
}
