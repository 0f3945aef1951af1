//! PostgreSQL-backed `InviteRepository`: invitations and verification links.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{InviteRepository, RepositoryError};
use crate::domain::{BrokerId, CustomerInvite, EmployeeInvite, InviteId, Verification};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CustomerInviteRow, EmployeeInviteRow, VerificationRow};
use super::pool::DbPool;
use super::schema::{customer_invites, employee_invites, verifications};

#[derive(Clone)]
pub struct DieselInviteRepository {
    pool: DbPool,
}

impl DieselInviteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InviteRepository for DieselInviteRepository {
    async fn save_employee_invite(&self, invite: &EmployeeInvite) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = EmployeeInviteRow::from(invite);
        diesel::insert_into(employee_invites::table)
            .values(&row)
            .on_conflict(employee_invites::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_employee_invite(
        &self,
        id: &InviteId,
    ) -> Result<Option<EmployeeInvite>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<EmployeeInviteRow> = employee_invites::table
            .find(id.as_uuid())
            .select(EmployeeInviteRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(EmployeeInvite::try_from).transpose()
    }

    async fn save_customer_invite(&self, invite: &CustomerInvite) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = CustomerInviteRow::from(invite);
        diesel::insert_into(customer_invites::table)
            .values(&row)
            .on_conflict(customer_invites::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_customer_invite(
        &self,
        id: &InviteId,
    ) -> Result<Option<CustomerInvite>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CustomerInviteRow> = customer_invites::table
            .find(id.as_uuid())
            .select(CustomerInviteRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(CustomerInvite::try_from).transpose()
    }

    async fn pending_customer_invites(
        &self,
        broker_id: &BrokerId,
    ) -> Result<Vec<CustomerInvite>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CustomerInviteRow> = customer_invites::table
            .filter(customer_invites::broker_id.eq(broker_id.as_uuid()))
            .filter(customer_invites::accepted_at.is_null())
            .select(CustomerInviteRow::as_select())
            .order(customer_invites::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(CustomerInvite::try_from).collect()
    }

    async fn insert_verification(
        &self,
        verification: &Verification,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(verifications::table)
            .values(&VerificationRow::from(verification))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_verification(
        &self,
        token_hash: &str,
    ) -> Result<Option<Verification>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<VerificationRow> = verifications::table
            .find(token_hash)
            .select(VerificationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Verification::try_from).transpose()
    }

    async fn consume_verification(
        &self,
        token_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // The `consumed_at IS NULL` guard makes the stamp a compare-and-set.
        let stamped = diesel::update(
            verifications::table
                .find(token_hash)
                .filter(verifications::consumed_at.is_null()),
        )
        .set(verifications::consumed_at.eq(Some(at)))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(stamped == 1)
    }

    async fn release_verification(&self, token_hash: &str) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let cleared = diesel::update(
            verifications::table
                .find(token_hash)
                .filter(verifications::consumed_at.is_not_null()),
        )
        .set(verifications::consumed_at.eq(None::<DateTime<Utc>>))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(cleared == 1)
    }
}
