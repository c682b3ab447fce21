//! Mock ticket API
//!
//! Each call waits for the simulated round trip first. Listing additionally
//! fails at random to mimic a flaky network.

use common::{ApiError, ApiResult, BackendContext};
use tracing::{info, warn};

use crate::{
    models::{NewTicket, Ticket, TicketPatch},
    repositories::TicketRepository,
};

/// Probability that `list` fails with a transient error
pub const DEFAULT_LIST_FAILURE_RATE: f64 = 0.02;

/// CRUD operations on tickets
#[derive(Debug, Clone)]
pub struct TicketApi {
    ctx: BackendContext,
    tickets: TicketRepository,
    list_failure_rate: f64,
}

impl TicketApi {
    pub fn new(ctx: BackendContext) -> Self {
        Self {
            tickets: TicketRepository::new(ctx.clone()),
            ctx,
            list_failure_rate: DEFAULT_LIST_FAILURE_RATE,
        }
    }

    pub fn with_list_failure_rate(mut self, rate: f64) -> Self {
        self.list_failure_rate = rate;
        self
    }

    pub fn list_failure_rate(&self) -> f64 {
        self.list_failure_rate
    }

    /// All tickets, most recent first
    pub async fn list(&self) -> ApiResult<Vec<Ticket>> {
        self.ctx.network.round_trip().await;

        if self.ctx.network.roll(self.list_failure_rate) {
            warn!("Simulated network failure while listing tickets");
            return Err(ApiError::Transient(
                "Failed to load tickets. Please retry.".to_string(),
            ));
        }

        self.tickets.all()
    }

    /// `list`, retried on transient failures up to `attempts` tries in total
    pub async fn list_with_retry(&self, attempts: u32) -> ApiResult<Vec<Ticket>> {
        let mut attempt = 1;
        loop {
            match self.list().await {
                Err(e) if e.is_retryable() && attempt < attempts => {
                    info!("Retrying ticket list (attempt {} of {})", attempt + 1, attempts);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// A single ticket
    pub async fn get(&self, id: &str) -> ApiResult<Ticket> {
        self.ctx.network.round_trip().await;

        self.tickets
            .find(id)?
            .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))
    }

    /// Create a ticket and put it at the front of the list
    pub async fn create(&self, new_ticket: NewTicket) -> ApiResult<Ticket> {
        self.ctx.network.round_trip().await;

        new_ticket.validate().map_err(ApiError::Validation)?;
        self.tickets.create(new_ticket).await
    }

    /// Shallow-merge `patch` into an existing ticket
    pub async fn update(&self, id: &str, patch: &TicketPatch) -> ApiResult<Ticket> {
        self.ctx.network.round_trip().await;

        self.tickets.update(id, patch).await
    }

    /// Remove a ticket; removing an unknown ID succeeds
    pub async fn remove(&self, id: &str) -> ApiResult<()> {
        self.ctx.network.round_trip().await;

        self.tickets.remove(id).await?;
        Ok(())
    }
}
