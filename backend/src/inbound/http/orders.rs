//! Leasing order handlers.
//!
//! Responses embed the rendered status timeline so the portal does not
//! need to know the step order.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Order, OrderId, OrderRequest, OrderStatus, TimelineStep};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, OrderSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, parse_id};

/// An order plus its timeline.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub timeline: Vec<TimelineStep>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        let timeline = order.timeline();
        Self { order, timeline }
    }
}

/// Body of `POST /api/v1/orders`.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub vehicle_id: String,
    #[schema(example = 36)]
    pub duration_months: u16,
    #[schema(example = 15000)]
    pub annual_mileage_km: u32,
    pub notes: Option<String>,
}

/// Body of `PUT /api/v1/orders/{id}/status`.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusRequest {
    #[schema(example = "contract_created")]
    pub status: String,
}

fn order_id(raw: &str) -> ApiResult<OrderId> {
    parse_id(raw, FieldName::new("id"))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "Orders visible to the caller, newest first", body = [OrderSchema]),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "listOrders"
)]
#[get("/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<OrderView>>> {
    let principal = session.principal(&state.auth).await?;
    let orders = state.orders.list(&principal).await?;
    Ok(web::Json(orders.into_iter().map(OrderView::from).collect()))
}

/// Order a visible vehicle at an offered rate.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order submitted", body = OrderSchema),
        (status = 400, description = "Rate not offered or vehicle unavailable", body = ErrorSchema),
        (status = 403, description = "Caller may not order", body = ErrorSchema),
        (status = 404, description = "Unknown or hidden vehicle", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "createOrder"
)]
#[post("/orders")]
pub async fn create_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateOrderRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let CreateOrderRequest {
        vehicle_id,
        duration_months,
        annual_mileage_km,
        notes,
    } = payload.into_inner();
    let request = OrderRequest {
        vehicle_id: parse_id(&vehicle_id, FieldName::new("vehicleId"))?,
        duration_months,
        annual_mileage_km,
        notes: notes
            .map(|notes| notes.trim().to_owned())
            .filter(|notes| !notes.is_empty()),
    };
    let order = state.orders.create(&principal, request).await?;
    Ok(HttpResponse::Created().json(OrderView::from(order)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with timeline", body = OrderSchema),
        (status = 404, description = "Unknown or hidden order", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrderView>> {
    let principal = session.principal(&state.auth).await?;
    let id = order_id(&path)?;
    let order = state.orders.get(&principal, &id).await?;
    Ok(web::Json(order.into()))
}

/// Move an order to another status and notify the orderer.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    params(("id" = String, Path, description = "Order id")),
    request_body = OrderStatusRequest,
    responses(
        (status = 200, description = "Order with timeline", body = OrderSchema),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 403, description = "Admins and the order's broker only", body = ErrorSchema),
        (status = 404, description = "Unknown or hidden order", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "updateOrderStatus"
)]
#[put("/orders/{id}/status")]
pub async fn update_order_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<OrderStatusRequest>,
) -> ApiResult<web::Json<OrderView>> {
    let principal = session.principal(&state.auth).await?;
    let id = order_id(&path)?;
    let status = payload
        .status
        .parse::<OrderStatus>()
        .map_err(|err| field_error("status", "invalid_status", err))?;
    let order = state.orders.update_status(&principal, &id, status).await?;
    Ok(web::Json(order.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 404, description = "Unknown order", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "deleteOrder"
)]
#[delete("/orders/{id}")]
pub async fn delete_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let id = order_id(&path)?;
    state.orders.delete(&principal, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
