//! Ticket service models

pub mod ticket;

pub use ticket::{NewTicket, Ticket, TicketPatch};
