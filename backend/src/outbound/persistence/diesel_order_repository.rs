//! PostgreSQL-backed `OrderRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{OrderRepository, OrderScope, RepositoryError};
use crate::domain::{Order, OrderId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::OrderRow;
use super::pool::DbPool;
use super::schema::orders;

#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn list(&self, scope: OrderScope) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = orders::table.select(OrderRow::as_select()).into_boxed();
        match scope {
            OrderScope::All => {}
            OrderScope::Broker(broker_id) => {
                query = query.filter(orders::broker_id.eq(*broker_id.as_uuid()));
            }
            OrderScope::OrderedBy(user_id) => {
                query = query.filter(orders::ordered_by.eq(*user_id.as_uuid()));
            }
        }
        let rows: Vec<OrderRow> = query
            .order(orders::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(Order::try_from).collect()
    }

    async fn find(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OrderRow> = orders::table
            .find(id.as_uuid())
            .select(OrderRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Order::try_from).transpose()
    }

    async fn save(&self, order: &Order) -> Result<(), RepositoryError> {
        let row = OrderRow::try_from(order)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(orders::table)
            .values(&row)
            .on_conflict(orders::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &OrderId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(orders::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
