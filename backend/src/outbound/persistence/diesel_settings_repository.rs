//! PostgreSQL-backed `SettingsRepository` over the single-row settings table.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::PortalSettings;
use crate::domain::ports::{RepositoryError, SettingsRepository};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{PortalSettingsRow, SETTINGS_ROW_ID};
use super::pool::DbPool;
use super::schema::portal_settings;

#[derive(Clone)]
pub struct DieselSettingsRepository {
    pool: DbPool,
}

impl DieselSettingsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for DieselSettingsRepository {
    async fn load(&self) -> Result<Option<PortalSettings>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PortalSettingsRow> = portal_settings::table
            .find(SETTINGS_ROW_ID)
            .select(PortalSettingsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(PortalSettings::try_from).transpose()
    }

    async fn save(&self, settings: &PortalSettings) -> Result<(), RepositoryError> {
        let row = PortalSettingsRow::try_from(settings)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(portal_settings::table)
            .values(&row)
            .on_conflict(portal_settings::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
