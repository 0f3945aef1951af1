//! Port for leasing orders.

use async_trait::async_trait;

use crate::domain::{BrokerId, Order, OrderId, UserId};

use super::RepositoryError;

/// Which orders a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    All,
    Broker(BrokerId),
    OrderedBy(UserId),
}

impl OrderScope {
    pub fn includes(&self, order: &Order) -> bool {
        match self {
            Self::All => true,
            Self::Broker(broker_id) => order.broker_id == Some(*broker_id),
            Self::OrderedBy(user_id) => order.ordered_by == *user_id,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Orders in `scope`, newest first.
    async fn list(&self, scope: OrderScope) -> Result<Vec<Order>, RepositoryError>;

    async fn find(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Insert or replace an order.
    async fn save(&self, order: &Order) -> Result<(), RepositoryError>;

    async fn delete(&self, id: &OrderId) -> Result<bool, RepositoryError>;
}
