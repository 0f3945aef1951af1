//! Placing orders and moving them along the status timeline.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    EmailMessage, EmailTemplate, Mailer, OrderRepository, OrderScope, UserRepository,
    map_repository_error,
};
use crate::domain::service_support::send_notification;
use crate::domain::vehicle::trim_optional;
use crate::domain::{
    Capability, Error, Order, OrderId, OrderStatus, Permission, PortalLinks, Principal,
    StatusChange, VehicleId,
};

use super::CatalogueService;
use super::catalogue_service::rate_not_offered;

/// Order form as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub vehicle_id: VehicleId,
    pub duration_months: u16,
    pub annual_mileage_km: u32,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct OrderDeps {
    pub orders: Arc<dyn OrderRepository>,
    pub users: Arc<dyn UserRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Clone)]
pub struct OrderService {
    deps: OrderDeps,
    catalogue: CatalogueService,
    links: PortalLinks,
}

/// Orders a principal may see.
fn scope_for(principal: &Principal) -> Option<OrderScope> {
    match principal.permission {
        Permission::Admin => Some(OrderScope::All),
        Permission::Broker => principal.profile.broker_id.map(OrderScope::Broker),
        Permission::Employee | Permission::SalaryEmployee | Permission::Customer => {
            Some(OrderScope::OrderedBy(principal.profile.id))
        }
    }
}

impl OrderService {
    pub fn new(deps: OrderDeps, catalogue: CatalogueService, links: PortalLinks) -> Self {
        Self {
            deps,
            catalogue,
            links,
        }
    }

    /// Place an order for a visible, available vehicle.
    pub async fn create(&self, principal: &Principal, request: OrderRequest) -> Result<Order, Error> {
        principal.require(Capability::PlaceOrders)?;
        let vehicle = self
            .catalogue
            .get_vehicle(principal, &request.vehicle_id)
            .await?;
        if !vehicle.available {
            return Err(Error::invalid_request("vehicle is not available")
                .with_details(json!({ "field": "vehicleId", "code": "vehicle_unavailable" })));
        }
        let monthly_rate_cents = vehicle
            .price_matrix
            .rate_for(request.duration_months, request.annual_mileage_km)
            .ok_or_else(|| rate_not_offered(request.duration_months, request.annual_mileage_km))?;

        let now = self.deps.clock.utc();
        let status = OrderStatus::CreditCheckStarted;
        let order = Order {
            id: OrderId::random(),
            vehicle_id: vehicle.id,
            ordered_by: principal.profile.id,
            company_id: principal.profile.company_id,
            broker_id: principal.profile.broker_id,
            duration_months: request.duration_months,
            annual_mileage_km: request.annual_mileage_km,
            monthly_rate_cents,
            status,
            status_history: vec![StatusChange { status, at: now }],
            notes: trim_optional(request.notes),
            created_at: now,
            updated_at: now,
        };
        self.deps
            .orders
            .save(&order)
            .await
            .map_err(|err| map_repository_error("order", err))?;
        info!(
            order_id = %order.id,
            vehicle_id = %vehicle.id,
            user_id = %principal.profile.id,
            "order placed"
        );
        Ok(order)
    }

    pub async fn list(&self, principal: &Principal) -> Result<Vec<Order>, Error> {
        let Some(scope) = scope_for(principal) else {
            return Ok(Vec::new());
        };
        self.deps
            .orders
            .list(scope)
            .await
            .map_err(|err| map_repository_error("order", err))
    }

    /// An order the caller may see; others are reported as not found.
    pub async fn get(&self, principal: &Principal, id: &OrderId) -> Result<Order, Error> {
        let scope = scope_for(principal);
        self.deps
            .orders
            .find(id)
            .await
            .map_err(|err| map_repository_error("order", err))?
            .filter(|order| scope.is_some_and(|scope| scope.includes(order)))
            .ok_or_else(|| Error::not_found("order not found"))
    }

    /// Move an order to `status` and notify the person who placed it.
    ///
    /// Admins may update any order, brokers only orders carrying their
    /// broker id. Setting the current status again is a no-op.
    pub async fn update_status(
        &self,
        principal: &Principal,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, Error> {
        let mut order = self.get(principal, id).await?;
        let may_update = principal.permission.allows(Capability::ManageOrders)
            || (principal.permission == Permission::Broker
                && order.broker_id.is_some()
                && order.broker_id == principal.profile.broker_id);
        if !may_update {
            return Err(Error::forbidden("insufficient permissions"));
        }
        if order.status == status {
            return Ok(order);
        }
        order.advance(status, self.deps.clock.utc());
        self.deps
            .orders
            .save(&order)
            .await
            .map_err(|err| map_repository_error("order", err))?;
        info!(order_id = %order.id, status = status.as_str(), "order status changed");
        self.notify_orderer(&order).await;
        Ok(order)
    }

    /// Best effort: a failed lookup or send is logged and the status change
    /// stands.
    async fn notify_orderer(&self, order: &Order) {
        let orderer = match self.deps.users.find_by_id(&order.ordered_by).await {
            Ok(Some(orderer)) => orderer,
            Ok(None) => {
                warn!(order_id = %order.id, "orderer no longer exists; status e-mail skipped");
                return;
            }
            Err(error) => {
                warn!(order_id = %order.id, error = %error, "orderer lookup failed; status e-mail skipped");
                return;
            }
        };
        let message = EmailMessage::new(orderer.email.clone(), EmailTemplate::OrderStatusChanged)
            .with_name(orderer.display_name())
            .with_param("firstName", orderer.first_name.clone())
            .with_param("status", order.status.as_str())
            .with_param("statusLabel", order.status.label())
            .with_param("orderLink", self.links.order(&order.id));
        send_notification(self.deps.mailer.as_ref(), &message).await;
    }

    pub async fn delete(&self, principal: &Principal, id: &OrderId) -> Result<(), Error> {
        principal.require(Capability::ManageOrders)?;
        let removed = self
            .deps
            .orders
            .delete(id)
            .await
            .map_err(|err| map_repository_error("order", err))?;
        if !removed {
            return Err(Error::not_found("order not found"));
        }
        info!(order_id = %id, "order deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
