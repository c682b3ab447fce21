//! Navigation guard for protected routes
//!
//! On every navigation to a protected route the guard re-validates the
//! persisted session rather than trusting the in-memory slot, and enforces
//! expiry. A missing or expired session is wiped from both places and the
//! navigation is redirected to the login page.

use auth::SessionContext;
use serde::Serialize;
use tracing::{error, info};

use crate::routes::{LOGIN_PATH, Route};

/// Why a navigation was redirected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    SessionExpired,
}

impl RedirectReason {
    /// Value of the `m` query parameter on the login page
    pub fn code(&self) -> &'static str {
        match self {
            RedirectReason::SessionExpired => "session_expired",
        }
    }
}

/// Outcome of a navigation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Navigation {
    /// Render the route
    Proceed { route: Route },
    /// Go to `to` instead
    Redirect { to: String, reason: RedirectReason },
}

impl Navigation {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Navigation::Proceed { .. })
    }
}

/// Route guard backed by the persisted session
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: SessionContext,
}

impl RouteGuard {
    pub fn new(session: SessionContext) -> Self {
        Self { session }
    }

    /// Decide whether navigating to `location` may proceed
    pub async fn check(&self, location: &str) -> Navigation {
        let route = Route::resolve(location);
        if !route.requires_auth() {
            return Navigation::Proceed { route };
        }

        let api = self.session.api();
        let now = api.now_millis();

        match api.get_session() {
            Some(session) if !session.is_expired_at(now) => {
                // The persisted session is authoritative; keep the slot in step
                self.session.set_session(Some(session)).await;
                Navigation::Proceed { route }
            }
            stale => {
                info!(
                    "Blocking navigation to {} ({})",
                    location,
                    if stale.is_some() { "expired session" } else { "no session" }
                );

                if let Err(e) = api.clear_session() {
                    error!("Failed to clear persisted session: {}", e);
                }
                self.session.clear().await;

                let reason = RedirectReason::SessionExpired;
                Navigation::Redirect {
                    to: format!("{}?m={}", LOGIN_PATH, reason.code()),
                    reason,
                }
            }
        }
    }
}
