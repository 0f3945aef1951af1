//! Brands, vehicles and price quotes.

use std::sync::Arc;

use mockable::Clock;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{CatalogueRepository, map_repository_error};
use crate::domain::vehicle::{BRAND_NAME_MAX, check_length, trim_optional};
use crate::domain::{
    Brand, BrandId, Capability, CatalogueValidationError, Error, Principal, Vehicle,
    VehicleCategory, VehicleDraft, VehicleId, filter_by_categories,
};

/// Monthly rate for one duration/mileage combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub vehicle_id: VehicleId,
    pub duration_months: u16,
    pub annual_mileage_km: u32,
    pub monthly_rate_cents: i64,
}

pub(crate) fn catalogue_invalid(err: CatalogueValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "code": err.code() }))
}

#[derive(Clone)]
pub struct CatalogueService {
    repo: Arc<dyn CatalogueRepository>,
    clock: Arc<dyn Clock>,
}

impl CatalogueService {
    pub fn new(repo: Arc<dyn CatalogueRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub async fn list_brands(&self) -> Result<Vec<Brand>, Error> {
        self.repo
            .list_brands()
            .await
            .map_err(|err| map_repository_error("brand", err))
    }

    pub async fn get_brand(&self, id: &BrandId) -> Result<Brand, Error> {
        self.repo
            .find_brand(id)
            .await
            .map_err(|err| map_repository_error("brand", err))?
            .ok_or_else(|| Error::not_found("brand not found"))
    }

    fn brand_name(raw: &str) -> Result<String, Error> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(catalogue_invalid(CatalogueValidationError::Empty {
                field: "name",
            }));
        }
        check_length(name, "name", BRAND_NAME_MAX).map_err(catalogue_invalid)?;
        Ok(name.to_owned())
    }

    pub async fn create_brand(
        &self,
        principal: &Principal,
        name: &str,
        logo_key: Option<String>,
    ) -> Result<Brand, Error> {
        principal.require(Capability::ManageCatalogue)?;
        let brand = Brand {
            id: BrandId::random(),
            name: Self::brand_name(name)?,
            logo_key: trim_optional(logo_key),
            created_at: self.clock.utc(),
        };
        self.repo
            .save_brand(&brand)
            .await
            .map_err(|err| map_repository_error("brand", err))?;
        info!(brand_id = %brand.id, "brand created");
        Ok(brand)
    }

    pub async fn update_brand(
        &self,
        principal: &Principal,
        id: &BrandId,
        name: &str,
        logo_key: Option<String>,
    ) -> Result<Brand, Error> {
        principal.require(Capability::ManageCatalogue)?;
        let mut brand = self.get_brand(id).await?;
        brand.name = Self::brand_name(name)?;
        brand.logo_key = trim_optional(logo_key);
        self.repo
            .save_brand(&brand)
            .await
            .map_err(|err| map_repository_error("brand", err))?;
        Ok(brand)
    }

    /// Delete a brand that no vehicle references.
    pub async fn delete_brand(&self, principal: &Principal, id: &BrandId) -> Result<(), Error> {
        principal.require(Capability::ManageCatalogue)?;
        let in_use = self
            .repo
            .brand_in_use(id)
            .await
            .map_err(|err| map_repository_error("brand", err))?;
        if in_use {
            return Err(Error::conflict("brand is still used by vehicles")
                .with_details(json!({ "code": "brand_in_use" })));
        }
        let removed = self
            .repo
            .delete_brand(id)
            .await
            .map_err(|err| map_repository_error("brand", err))?;
        if !removed {
            return Err(Error::not_found("brand not found"));
        }
        info!(brand_id = %id, "brand deleted");
        Ok(())
    }

    /// Vehicles visible to the caller.
    ///
    /// `category` narrows the result further; asking for a category outside
    /// the caller's visible set yields an empty list.
    pub async fn list_vehicles(
        &self,
        principal: &Principal,
        category: Option<VehicleCategory>,
    ) -> Result<Vec<Vehicle>, Error> {
        let vehicles = self
            .repo
            .list_vehicles()
            .await
            .map_err(|err| map_repository_error("vehicle", err))?;
        let visible = principal.permission.visible_categories();
        let vehicles = filter_by_categories(vehicles, visible);
        Ok(match category {
            Some(category) => filter_by_categories(vehicles, &[category]),
            None => vehicles,
        })
    }

    /// A vehicle, hidden as not found when outside the caller's categories.
    pub async fn get_vehicle(&self, principal: &Principal, id: &VehicleId) -> Result<Vehicle, Error> {
        self.repo
            .find_vehicle(id)
            .await
            .map_err(|err| map_repository_error("vehicle", err))?
            .filter(|vehicle| vehicle.is_visible_in(principal.permission.visible_categories()))
            .ok_or_else(|| Error::not_found("vehicle not found"))
    }

    async fn ensure_brand(&self, id: &BrandId) -> Result<(), Error> {
        self.get_brand(id).await.map(|_| ()).map_err(|err| {
            Error::invalid_request(err.message().to_owned())
                .with_details(json!({ "field": "brandId", "code": "unknown_brand" }))
        })
    }

    pub async fn create_vehicle(
        &self,
        principal: &Principal,
        draft: VehicleDraft,
    ) -> Result<Vehicle, Error> {
        principal.require(Capability::ManageCatalogue)?;
        let draft = draft.validate().map_err(catalogue_invalid)?;
        self.ensure_brand(&draft.brand_id).await?;
        let now = self.clock.utc();
        let vehicle = Vehicle {
            id: VehicleId::random(),
            brand_id: draft.brand_id,
            model: draft.model,
            variant: draft.variant,
            fuel_type: draft.fuel_type,
            power_kw: draft.power_kw,
            list_price_cents: draft.list_price_cents,
            categories: draft.categories,
            price_matrix: draft.price_matrix,
            image_keys: draft.image_keys,
            description: draft.description,
            available: draft.available,
            created_at: now,
            updated_at: now,
        };
        self.repo
            .save_vehicle(&vehicle)
            .await
            .map_err(|err| map_repository_error("vehicle", err))?;
        info!(vehicle_id = %vehicle.id, "vehicle created");
        Ok(vehicle)
    }

    pub async fn update_vehicle(
        &self,
        principal: &Principal,
        id: &VehicleId,
        draft: VehicleDraft,
    ) -> Result<Vehicle, Error> {
        principal.require(Capability::ManageCatalogue)?;
        let draft = draft.validate().map_err(catalogue_invalid)?;
        let existing = self.get_vehicle(principal, id).await?;
        if existing.brand_id != draft.brand_id {
            self.ensure_brand(&draft.brand_id).await?;
        }
        let vehicle = Vehicle {
            brand_id: draft.brand_id,
            model: draft.model,
            variant: draft.variant,
            fuel_type: draft.fuel_type,
            power_kw: draft.power_kw,
            list_price_cents: draft.list_price_cents,
            categories: draft.categories,
            price_matrix: draft.price_matrix,
            image_keys: draft.image_keys,
            description: draft.description,
            available: draft.available,
            updated_at: self.clock.utc(),
            ..existing
        };
        self.repo
            .save_vehicle(&vehicle)
            .await
            .map_err(|err| map_repository_error("vehicle", err))?;
        Ok(vehicle)
    }

    pub async fn delete_vehicle(&self, principal: &Principal, id: &VehicleId) -> Result<(), Error> {
        principal.require(Capability::ManageCatalogue)?;
        let removed = self
            .repo
            .delete_vehicle(id)
            .await
            .map_err(|err| map_repository_error("vehicle", err))?;
        if !removed {
            return Err(Error::not_found("vehicle not found"));
        }
        info!(vehicle_id = %id, "vehicle deleted");
        Ok(())
    }

    /// Exact monthly rate for a visible vehicle.
    pub async fn quote(
        &self,
        principal: &Principal,
        id: &VehicleId,
        duration_months: u16,
        annual_mileage_km: u32,
    ) -> Result<Quote, Error> {
        let vehicle = self.get_vehicle(principal, id).await?;
        let monthly_rate_cents = vehicle
            .price_matrix
            .rate_for(duration_months, annual_mileage_km)
            .ok_or_else(|| rate_not_offered(duration_months, annual_mileage_km))?;
        Ok(Quote {
            vehicle_id: vehicle.id,
            duration_months,
            annual_mileage_km,
            monthly_rate_cents,
        })
    }
}

pub(crate) fn rate_not_offered(duration_months: u16, annual_mileage_km: u32) -> Error {
    Error::invalid_request("no rate for this duration and mileage").with_details(json!({
        "code": "rate_not_offered",
        "durationMonths": duration_months,
        "annualMileageKm": annual_mileage_km,
    }))
}

#[cfg(test)]
mod tests;
