//! Port for brands and vehicles.

use async_trait::async_trait;

use crate::domain::{Brand, BrandId, Vehicle, VehicleId};

use super::RepositoryError;

/// Persistence for the vehicle catalogue.
///
/// `save_*` methods upsert by id. Deletes report whether a row was removed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueRepository: Send + Sync {
    /// Brands ordered by name.
    async fn list_brands(&self) -> Result<Vec<Brand>, RepositoryError>;

    async fn find_brand(&self, id: &BrandId) -> Result<Option<Brand>, RepositoryError>;

    async fn save_brand(&self, brand: &Brand) -> Result<(), RepositoryError>;

    async fn delete_brand(&self, id: &BrandId) -> Result<bool, RepositoryError>;

    /// Vehicles ordered by creation time, newest first.
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, RepositoryError>;

    async fn find_vehicle(&self, id: &VehicleId) -> Result<Option<Vehicle>, RepositoryError>;

    async fn save_vehicle(&self, vehicle: &Vehicle) -> Result<(), RepositoryError>;

    async fn delete_vehicle(&self, id: &VehicleId) -> Result<bool, RepositoryError>;

    /// Whether any vehicle still references the brand.
    async fn brand_in_use(&self, id: &BrandId) -> Result<bool, RepositoryError>;
}
