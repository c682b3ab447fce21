//! Persistence of the single session slot

use common::{
    ApiResult, BackendContext,
    store::{read_json, write_json},
};
use tracing::{info, warn};

use crate::models::Session;

/// Storage key holding the JSON-encoded active session
pub const SESSION_KEY: &str = "ticketapp_session";

/// Session repository
#[derive(Debug, Clone)]
pub struct SessionRepository {
    ctx: BackendContext,
}

impl SessionRepository {
    pub fn new(ctx: BackendContext) -> Self {
        Self { ctx }
    }

    /// Read the persisted session; never fails
    pub fn load(&self) -> Option<Session> {
        match read_json(self.ctx.store.as_ref(), SESSION_KEY) {
            Ok(session) => session,
            Err(e) => {
                warn!("Failed to read persisted session: {}", e);
                None
            }
        }
    }

    /// Replace the persisted session
    pub fn save(&self, session: &Session) -> ApiResult<()> {
        info!("Persisting session for user: {}", session.user.id);

        write_json(self.ctx.store.as_ref(), SESSION_KEY, session)
    }

    /// Delete the persisted session
    pub fn clear(&self) -> ApiResult<()> {
        info!("Clearing persisted session");

        self.ctx.store.remove(SESSION_KEY)?;
        Ok(())
    }
}
