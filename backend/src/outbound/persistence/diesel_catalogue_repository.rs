//! PostgreSQL-backed `CatalogueRepository` for brands and vehicles.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CatalogueRepository, RepositoryError};
use crate::domain::{Brand, BrandId, Vehicle, VehicleId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{BrandRow, VehicleRow};
use super::pool::DbPool;
use super::schema::{brands, vehicles};

#[derive(Clone)]
pub struct DieselCatalogueRepository {
    pool: DbPool,
}

impl DieselCatalogueRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogueRepository for DieselCatalogueRepository {
    async fn list_brands(&self) -> Result<Vec<Brand>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BrandRow> = brands::table
            .select(BrandRow::as_select())
            .order(brands::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Brand::from).collect())
    }

    async fn find_brand(&self, id: &BrandId) -> Result<Option<Brand>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BrandRow> = brands::table
            .find(id.as_uuid())
            .select(BrandRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Brand::from))
    }

    async fn save_brand(&self, brand: &Brand) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = BrandRow::from(brand);
        diesel::insert_into(brands::table)
            .values(&row)
            .on_conflict(brands::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete_brand(&self, id: &BrandId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(brands::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<VehicleRow> = vehicles::table
            .select(VehicleRow::as_select())
            .order(vehicles::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(Vehicle::try_from).collect()
    }

    async fn find_vehicle(&self, id: &VehicleId) -> Result<Option<Vehicle>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<VehicleRow> = vehicles::table
            .find(id.as_uuid())
            .select(VehicleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Vehicle::try_from).transpose()
    }

    async fn save_vehicle(&self, vehicle: &Vehicle) -> Result<(), RepositoryError> {
        let row = VehicleRow::try_from(vehicle)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(vehicles::table)
            .values(&row)
            .on_conflict(vehicles::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete_vehicle(&self, id: &VehicleId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(vehicles::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn brand_in_use(&self, id: &BrandId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            vehicles::table.filter(vehicles::brand_id.eq(id.as_uuid())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error)
    }
}
