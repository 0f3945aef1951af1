//! Port for support tickets.

use async_trait::async_trait;

use crate::domain::{Ticket, TicketId, UserId};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Tickets, newest first; restricted to one creator when given.
    async fn list(&self, created_by: Option<UserId>) -> Result<Vec<Ticket>, RepositoryError>;

    async fn find(&self, id: &TicketId) -> Result<Option<Ticket>, RepositoryError>;

    async fn save(&self, ticket: &Ticket) -> Result<(), RepositoryError>;
}
