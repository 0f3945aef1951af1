//! Support tickets and their message threads.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{TicketRepository, map_repository_error};
use crate::domain::{
    Capability, Error, Principal, StorageKey, Ticket, TicketDraft, TicketId, TicketMessage,
    TicketStatus, TicketValidationError, UploadScope, validate_message_body,
};

fn ticket_invalid(err: TicketValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "code": err.code() }))
}

#[derive(Clone)]
pub struct TicketService {
    repo: Arc<dyn TicketRepository>,
    clock: Arc<dyn Clock>,
}

impl TicketService {
    pub fn new(repo: Arc<dyn TicketRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Open a ticket on behalf of the caller.
    ///
    /// Attachment keys must reference files uploaded to the `tickets` scope.
    pub async fn open(&self, principal: &Principal, draft: TicketDraft) -> Result<Ticket, Error> {
        for key in &draft.attachment_keys {
            let parsed = StorageKey::try_from(key.clone()).ok();
            if parsed.is_none_or(|parsed| parsed.scope() != UploadScope::Tickets) {
                return Err(Error::invalid_request("attachment key is not a ticket upload")
                    .with_details(json!({ "field": "attachmentKeys", "code": "invalid_key" })));
            }
        }
        let now = self.clock.utc();
        let ticket = Ticket {
            id: TicketId::random(),
            created_by: principal.profile.id,
            subject: draft.subject,
            description: draft.description,
            status: TicketStatus::Open,
            priority: draft.priority,
            attachment_keys: draft.attachment_keys,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.save(&ticket).await?;
        info!(ticket_id = %ticket.id, user_id = %principal.profile.id, "ticket opened");
        Ok(ticket)
    }

    /// All tickets for admins, the caller's own otherwise.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<Ticket>, Error> {
        let created_by = (!principal.is_admin()).then_some(principal.profile.id);
        self.repo
            .list(created_by)
            .await
            .map_err(|err| map_repository_error("ticket", err))
    }

    pub async fn get(&self, principal: &Principal, id: &TicketId) -> Result<Ticket, Error> {
        self.repo
            .find(id)
            .await
            .map_err(|err| map_repository_error("ticket", err))?
            .filter(|ticket| principal.is_admin() || ticket.created_by == principal.profile.id)
            .ok_or_else(|| Error::not_found("ticket not found"))
    }

    /// Append a message from the ticket owner or an admin.
    pub async fn add_message(
        &self,
        principal: &Principal,
        id: &TicketId,
        body: &str,
    ) -> Result<Ticket, Error> {
        let body = validate_message_body(body).map_err(ticket_invalid)?;
        let mut ticket = self.get(principal, id).await?;
        if ticket.is_closed() {
            return Err(Error::conflict("ticket is closed")
                .with_details(json!({ "code": "ticket_closed" })));
        }
        let now = self.clock.utc();
        ticket.messages.push(TicketMessage {
            author_id: principal.profile.id,
            body,
            at: now,
        });
        ticket.updated_at = now;
        self.save(&ticket).await?;
        Ok(ticket)
    }

    pub async fn set_status(
        &self,
        principal: &Principal,
        id: &TicketId,
        status: TicketStatus,
    ) -> Result<Ticket, Error> {
        principal.require(Capability::ManageTickets)?;
        let mut ticket = self.get(principal, id).await?;
        if ticket.status != status {
            ticket.status = status;
            ticket.updated_at = self.clock.utc();
            self.save(&ticket).await?;
            info!(ticket_id = %ticket.id, status = status.as_str(), "ticket status changed");
        }
        Ok(ticket)
    }

    async fn save(&self, ticket: &Ticket) -> Result<(), Error> {
        self.repo
            .save(ticket)
            .await
            .map_err(|err| map_repository_error("ticket", err))
    }
}
