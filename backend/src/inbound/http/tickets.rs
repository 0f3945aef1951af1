//! Support ticket handlers.

use actix_web::{HttpResponse, get, post, put, web};
use serde::Deserialize;

use crate::domain::{Ticket, TicketDraft, TicketId, TicketPriority, TicketStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, TicketSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, ticket_invalid};

/// Body of `POST /api/v1/tickets`.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketRequest {
    #[schema(example = "Rechnung fehlt")]
    pub subject: String,
    pub description: String,
    /// `low`, `normal` or `high`; defaults to `normal`.
    pub priority: Option<String>,
    /// Keys returned by `POST /api/v1/uploads/tickets`.
    #[serde(default)]
    pub attachment_keys: Vec<String>,
}

impl TryFrom<TicketRequest> for TicketDraft {
    type Error = crate::domain::Error;

    fn try_from(value: TicketRequest) -> Result<Self, Self::Error> {
        let priority = value
            .priority
            .as_deref()
            .map(str::parse::<TicketPriority>)
            .transpose()
            .map_err(ticket_invalid)?
            .unwrap_or_default();
        TicketDraft::new(
            &value.subject,
            &value.description,
            priority,
            value.attachment_keys,
        )
        .map_err(ticket_invalid)
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct TicketMessageRequest {
    pub body: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct TicketStatusRequest {
    #[schema(example = "in_progress")]
    pub status: String,
}

fn ticket_id(raw: &str) -> ApiResult<TicketId> {
    parse_id(raw, FieldName::new("id"))
}

#[utoipa::path(
    get,
    path = "/api/v1/tickets",
    responses(
        (status = 200, description = "Every ticket for admins, own tickets otherwise", body = [TicketSchema]),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "listTickets"
)]
#[get("/tickets")]
pub async fn list_tickets(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Ticket>>> {
    let principal = session.principal(&state.auth).await?;
    Ok(web::Json(state.tickets.list(&principal).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    request_body = TicketRequest,
    responses(
        (status = 201, description = "Ticket opened", body = TicketSchema),
        (status = 400, description = "Invalid ticket", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "openTicket"
)]
#[post("/tickets")]
pub async fn open_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TicketRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let draft = TicketDraft::try_from(payload.into_inner())?;
    let ticket = state.tickets.open(&principal, draft).await?;
    Ok(HttpResponse::Created().json(ticket))
}

#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}",
    params(("id" = String, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Ticket with messages", body = TicketSchema),
        (status = 404, description = "Unknown or foreign ticket", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "getTicket"
)]
#[get("/tickets/{id}")]
pub async fn get_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Ticket>> {
    let principal = session.principal(&state.auth).await?;
    let id = ticket_id(&path)?;
    Ok(web::Json(state.tickets.get(&principal, &id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/messages",
    params(("id" = String, Path, description = "Ticket id")),
    request_body = TicketMessageRequest,
    responses(
        (status = 200, description = "Ticket with the new message", body = TicketSchema),
        (status = 400, description = "Empty message", body = ErrorSchema),
        (status = 404, description = "Unknown or foreign ticket", body = ErrorSchema),
        (status = 409, description = "Ticket is closed", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "addTicketMessage"
)]
#[post("/tickets/{id}/messages")]
pub async fn add_ticket_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<TicketMessageRequest>,
) -> ApiResult<web::Json<Ticket>> {
    let principal = session.principal(&state.auth).await?;
    let id = ticket_id(&path)?;
    let ticket = state
        .tickets
        .add_message(&principal, &id, &payload.body)
        .await?;
    Ok(web::Json(ticket))
}

#[utoipa::path(
    put,
    path = "/api/v1/tickets/{id}/status",
    params(("id" = String, Path, description = "Ticket id")),
    request_body = TicketStatusRequest,
    responses(
        (status = 200, description = "Ticket updated", body = TicketSchema),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 404, description = "Unknown ticket", body = ErrorSchema)
    ),
    tags = ["tickets"],
    operation_id = "setTicketStatus"
)]
#[put("/tickets/{id}/status")]
pub async fn set_ticket_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<TicketStatusRequest>,
) -> ApiResult<web::Json<Ticket>> {
    let principal = session.principal(&state.auth).await?;
    let id = ticket_id(&path)?;
    let status = payload
        .status
        .parse::<TicketStatus>()
        .map_err(ticket_invalid)?;
    Ok(web::Json(
        state.tickets.set_status(&principal, &id, status).await?,
    ))
}
