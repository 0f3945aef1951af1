//! PostgreSQL-backed `OrganisationRepository` for companies and brokers.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{OrganisationRepository, RepositoryError};
use crate::domain::{Broker, BrokerId, Company, CompanyId, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{BrokerRow, CompanyRow};
use super::pool::DbPool;
use super::schema::{brokers, companies};

#[derive(Clone)]
pub struct DieselOrganisationRepository {
    pool: DbPool,
}

impl DieselOrganisationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganisationRepository for DieselOrganisationRepository {
    async fn list_companies(&self) -> Result<Vec<Company>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CompanyRow> = companies::table
            .select(CompanyRow::as_select())
            .order(companies::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(Company::try_from).collect()
    }

    async fn find_company(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CompanyRow> = companies::table
            .find(id.as_uuid())
            .select(CompanyRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Company::try_from).transpose()
    }

    async fn save_company(&self, company: &Company) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = CompanyRow::from(company);
        diesel::insert_into(companies::table)
            .values(&row)
            .on_conflict(companies::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete_company(&self, id: &CompanyId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(companies::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn list_brokers(&self) -> Result<Vec<Broker>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BrokerRow> = brokers::table
            .select(BrokerRow::as_select())
            .order(brokers::company_name.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(Broker::try_from).collect()
    }

    async fn find_broker(&self, id: &BrokerId) -> Result<Option<Broker>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BrokerRow> = brokers::table
            .find(id.as_uuid())
            .select(BrokerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Broker::try_from).transpose()
    }

    async fn find_broker_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Broker>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BrokerRow> = brokers::table
            .filter(brokers::user_id.eq(user_id.as_uuid()))
            .select(BrokerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Broker::try_from).transpose()
    }

    async fn save_broker(&self, broker: &Broker) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = BrokerRow::from(broker);
        diesel::insert_into(brokers::table)
            .values(&row)
            .on_conflict(brokers::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete_broker(&self, id: &BrokerId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(brokers::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
