//! Brand and vehicle catalogue handlers.
//!
//! ```text
//! GET    /api/v1/brands
//! POST   /api/v1/brands {"name":"Volkswagen","logoKey":"brands/….png"}
//! GET    /api/v1/vehicles?category=salary
//! GET    /api/v1/vehicles/{id}/quote?durationMonths=36&annualMileageKm=15000
//! ```

use std::collections::BTreeSet;

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{
    Brand, BrandId, FuelType, PriceMatrix, Quote, Vehicle, VehicleCategory, VehicleDraft,
    VehicleId, catalogue_invalid,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{BrandSchema, ErrorSchema, QuoteSchema, VehicleSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Body of brand create and update requests.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandRequest {
    #[schema(example = "Volkswagen")]
    pub name: String,
    /// Key returned by `POST /api/v1/uploads/brands`.
    pub logo_key: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceMatrixRequest {
    pub durations_months: Vec<u16>,
    pub annual_mileages_km: Vec<u32>,
    pub monthly_rates_cents: Vec<Vec<i64>>,
}

/// Body of vehicle create and update requests.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRequest {
    pub brand_id: String,
    #[schema(example = "ID.4")]
    pub model: String,
    pub variant: Option<String>,
    #[schema(example = "electric")]
    pub fuel_type: String,
    pub power_kw: Option<u32>,
    pub list_price_cents: i64,
    #[schema(example = json!(["company", "salary"]))]
    pub categories: Vec<String>,
    pub price_matrix: PriceMatrixRequest,
    #[serde(default)]
    pub image_keys: Vec<String>,
    pub description: Option<String>,
    #[serde(default = "available_by_default")]
    pub available: bool,
}

fn available_by_default() -> bool {
    true
}

impl TryFrom<VehicleRequest> for VehicleDraft {
    type Error = crate::domain::Error;

    fn try_from(value: VehicleRequest) -> Result<Self, Self::Error> {
        let categories = value
            .categories
            .iter()
            .map(|raw| raw.parse::<VehicleCategory>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(catalogue_invalid)?;
        let matrix = value.price_matrix;
        Ok(Self {
            brand_id: parse_id(&value.brand_id, FieldName::new("brandId"))?,
            model: value.model,
            variant: value.variant,
            fuel_type: value
                .fuel_type
                .parse::<FuelType>()
                .map_err(catalogue_invalid)?,
            power_kw: value.power_kw,
            list_price_cents: value.list_price_cents,
            categories,
            price_matrix: PriceMatrix::new(
                matrix.durations_months,
                matrix.annual_mileages_km,
                matrix.monthly_rates_cents,
            )
            .map_err(catalogue_invalid)?,
            image_keys: value.image_keys,
            description: value.description,
            available: value.available,
        })
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VehicleQuery {
    /// Restrict to one category; the caller's permission still applies.
    #[param(example = "salary")]
    pub category: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct QuoteQuery {
    #[param(example = 36)]
    pub duration_months: u16,
    #[param(example = 15000)]
    pub annual_mileage_km: u32,
}

fn brand_id(raw: &str) -> ApiResult<BrandId> {
    parse_id(raw, FieldName::new("id"))
}

fn vehicle_id(raw: &str) -> ApiResult<VehicleId> {
    parse_id(raw, FieldName::new("id"))
}

#[utoipa::path(
    get,
    path = "/api/v1/brands",
    responses(
        (status = 200, description = "Brands by name", body = [BrandSchema]),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "listBrands"
)]
#[get("/brands")]
pub async fn list_brands(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Brand>>> {
    session.principal(&state.auth).await?;
    Ok(web::Json(state.catalogue.list_brands().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/brands/{id}",
    params(("id" = String, Path, description = "Brand id")),
    responses(
        (status = 200, description = "Brand", body = BrandSchema),
        (status = 404, description = "Unknown brand", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "getBrand"
)]
#[get("/brands/{id}")]
pub async fn get_brand(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Brand>> {
    session.principal(&state.auth).await?;
    let id = brand_id(&path)?;
    Ok(web::Json(state.catalogue.get_brand(&id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/brands",
    request_body = BrandRequest,
    responses(
        (status = 201, description = "Brand created", body = BrandSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "createBrand"
)]
#[post("/brands")]
pub async fn create_brand(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BrandRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let BrandRequest { name, logo_key } = payload.into_inner();
    let brand = state
        .catalogue
        .create_brand(&principal, &name, logo_key)
        .await?;
    Ok(HttpResponse::Created().json(brand))
}

#[utoipa::path(
    put,
    path = "/api/v1/brands/{id}",
    params(("id" = String, Path, description = "Brand id")),
    request_body = BrandRequest,
    responses(
        (status = 200, description = "Brand updated", body = BrandSchema),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 404, description = "Unknown brand", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "updateBrand"
)]
#[put("/brands/{id}")]
pub async fn update_brand(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<BrandRequest>,
) -> ApiResult<web::Json<Brand>> {
    let principal = session.principal(&state.auth).await?;
    let id = brand_id(&path)?;
    let BrandRequest { name, logo_key } = payload.into_inner();
    let brand = state
        .catalogue
        .update_brand(&principal, &id, &name, logo_key)
        .await?;
    Ok(web::Json(brand))
}

#[utoipa::path(
    delete,
    path = "/api/v1/brands/{id}",
    params(("id" = String, Path, description = "Brand id")),
    responses(
        (status = 204, description = "Brand deleted"),
        (status = 404, description = "Unknown brand", body = ErrorSchema),
        (status = 409, description = "Brand still used by vehicles", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "deleteBrand"
)]
#[delete("/brands/{id}")]
pub async fn delete_brand(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let id = brand_id(&path)?;
    state.catalogue.delete_brand(&principal, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Vehicles visible to the caller's permission.
#[utoipa::path(
    get,
    path = "/api/v1/vehicles",
    params(VehicleQuery),
    responses(
        (status = 200, description = "Visible vehicles", body = [VehicleSchema]),
        (status = 400, description = "Unknown category", body = ErrorSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "listVehicles"
)]
#[get("/vehicles")]
pub async fn list_vehicles(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<VehicleQuery>,
) -> ApiResult<web::Json<Vec<Vehicle>>> {
    let principal = session.principal(&state.auth).await?;
    let category = query
        .category
        .as_deref()
        .map(str::parse::<VehicleCategory>)
        .transpose()
        .map_err(catalogue_invalid)?;
    let vehicles = state.catalogue.list_vehicles(&principal, category).await?;
    Ok(web::Json(vehicles))
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles/{id}",
    params(("id" = String, Path, description = "Vehicle id")),
    responses(
        (status = 200, description = "Vehicle", body = VehicleSchema),
        (status = 404, description = "Unknown or hidden vehicle", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "getVehicle"
)]
#[get("/vehicles/{id}")]
pub async fn get_vehicle(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vehicle>> {
    let principal = session.principal(&state.auth).await?;
    let id = vehicle_id(&path)?;
    Ok(web::Json(state.catalogue.get_vehicle(&principal, &id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/vehicles",
    request_body = VehicleRequest,
    responses(
        (status = 201, description = "Vehicle created", body = VehicleSchema),
        (status = 400, description = "Invalid vehicle or price matrix", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "createVehicle"
)]
#[post("/vehicles")]
pub async fn create_vehicle(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<VehicleRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let draft = VehicleDraft::try_from(payload.into_inner())?;
    let vehicle = state.catalogue.create_vehicle(&principal, draft).await?;
    Ok(HttpResponse::Created().json(vehicle))
}

#[utoipa::path(
    put,
    path = "/api/v1/vehicles/{id}",
    params(("id" = String, Path, description = "Vehicle id")),
    request_body = VehicleRequest,
    responses(
        (status = 200, description = "Vehicle updated", body = VehicleSchema),
        (status = 400, description = "Invalid vehicle or price matrix", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 404, description = "Unknown vehicle", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "updateVehicle"
)]
#[put("/vehicles/{id}")]
pub async fn update_vehicle(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<VehicleRequest>,
) -> ApiResult<web::Json<Vehicle>> {
    let principal = session.principal(&state.auth).await?;
    let id = vehicle_id(&path)?;
    let draft = VehicleDraft::try_from(payload.into_inner())?;
    let vehicle = state.catalogue.update_vehicle(&principal, &id, draft).await?;
    Ok(web::Json(vehicle))
}

#[utoipa::path(
    delete,
    path = "/api/v1/vehicles/{id}",
    params(("id" = String, Path, description = "Vehicle id")),
    responses(
        (status = 204, description = "Vehicle deleted"),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 404, description = "Unknown vehicle", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "deleteVehicle"
)]
#[delete("/vehicles/{id}")]
pub async fn delete_vehicle(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state.auth).await?;
    let id = vehicle_id(&path)?;
    state.catalogue.delete_vehicle(&principal, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Monthly rate for a duration and annual mileage offered in the matrix.
#[utoipa::path(
    get,
    path = "/api/v1/vehicles/{id}/quote",
    params(("id" = String, Path, description = "Vehicle id"), QuoteQuery),
    responses(
        (status = 200, description = "Monthly rate", body = QuoteSchema),
        (status = 400, description = "Combination not offered", body = ErrorSchema),
        (status = 404, description = "Unknown or hidden vehicle", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "quoteVehicle"
)]
#[get("/vehicles/{id}/quote")]
pub async fn quote_vehicle(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<QuoteQuery>,
) -> ApiResult<web::Json<Quote>> {
    let principal = session.principal(&state.auth).await?;
    let id = vehicle_id(&path)?;
    let quote = state
        .catalogue
        .quote(&principal, &id, query.duration_months, query.annual_mileage_km)
        .await?;
    Ok(web::Json(quote))
}
