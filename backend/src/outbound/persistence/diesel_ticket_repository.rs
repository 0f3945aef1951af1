//! PostgreSQL-backed `TicketRepository`. Messages live in a JSONB column.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RepositoryError, TicketRepository};
use crate::domain::{Ticket, TicketId, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::TicketRow;
use super::pool::DbPool;
use super::schema::tickets;

#[derive(Clone)]
pub struct DieselTicketRepository {
    pool: DbPool,
}

impl DieselTicketRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for DieselTicketRepository {
    async fn list(&self, created_by: Option<UserId>) -> Result<Vec<Ticket>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = tickets::table.select(TicketRow::as_select()).into_boxed();
        if let Some(user_id) = created_by {
            query = query.filter(tickets::created_by.eq(*user_id.as_uuid()));
        }
        let rows: Vec<TicketRow> = query
            .order(tickets::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(Ticket::try_from).collect()
    }

    async fn find(&self, id: &TicketId) -> Result<Option<Ticket>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TicketRow> = tickets::table
            .find(id.as_uuid())
            .select(TicketRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Ticket::try_from).transpose()
    }

    async fn save(&self, ticket: &Ticket) -> Result<(), RepositoryError> {
        let row = TicketRow::try_from(ticket)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(tickets::table)
            .values(&row)
            .on_conflict(tickets::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
