//! Ticket repository for store operations
//!
//! The whole collection lives under one key. Every mutation is
//! read-modify-write of the full list, serialized by a write lock so that
//! concurrent calls within a process cannot lose each other's updates.

use common::{
    ApiError, ApiResult, BackendContext,
    store::{read_json_list, write_json},
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::{NewTicket, Ticket, TicketPatch};

/// Storage key holding the JSON array of tickets
pub const TICKETS_KEY: &str = "ticketapp_tickets";

/// Ticket repository
#[derive(Debug, Clone)]
pub struct TicketRepository {
    ctx: BackendContext,
    write_lock: Arc<Mutex<()>>,
}

impl TicketRepository {
    /// Create a new ticket repository
    pub fn new(ctx: BackendContext) -> Self {
        Self {
            ctx,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// All tickets, most recent first
    pub fn all(&self) -> ApiResult<Vec<Ticket>> {
        Ok(read_json_list(self.ctx.store.as_ref(), TICKETS_KEY)?)
    }

    /// Get a ticket by ID
    pub fn find(&self, id: &str) -> ApiResult<Option<Ticket>> {
        Ok(self.all()?.into_iter().find(|t| t.id == id))
    }

    /// Store a validated ticket at the front of the collection
    pub async fn create(&self, new_ticket: NewTicket) -> ApiResult<Ticket> {
        let _guard = self.write_lock.lock().await;
        let mut tickets = self.all()?;

        let id = self
            .ctx
            .next_id("t_", |id| tickets.iter().any(|t| t.id == id));
        let ticket = new_ticket.into_ticket(id, self.ctx.now_millis());
        info!("Creating ticket: {}", ticket.id);

        tickets.insert(0, ticket.clone());
        self.save(&tickets)?;

        Ok(ticket)
    }

    /// Merge `patch` into the ticket with the given ID
    pub async fn update(&self, id: &str, patch: &TicketPatch) -> ApiResult<Ticket> {
        let _guard = self.write_lock.lock().await;
        let mut tickets = self.all()?;

        let slot = tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))?;

        let updated = slot
            .patched(patch, self.ctx.now_millis())
            .map_err(ApiError::Validation)?;
        *slot = updated.clone();
        info!("Updated ticket: {}", id);

        self.save(&tickets)?;
        Ok(updated)
    }

    /// Remove every ticket with the given ID; returns whether one existed
    pub async fn remove(&self, id: &str) -> ApiResult<bool> {
        let _guard = self.write_lock.lock().await;
        let mut tickets = self.all()?;

        let before = tickets.len();
        tickets.retain(|t| t.id != id);
        let removed = tickets.len() != before;
        info!("Removing ticket {} (existed: {})", id, removed);

        self.save(&tickets)?;
        Ok(removed)
    }

    fn save(&self, tickets: &[Ticket]) -> ApiResult<()> {
        write_json(self.ctx.store.as_ref(), TICKETS_KEY, tickets)
    }
}
