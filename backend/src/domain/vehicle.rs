//! Catalogue documents: brands, vehicles, categories and leasing prices.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BrandId, VehicleId};

/// Validation errors for catalogue input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogueValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} must be positive")]
    NotPositive { field: &'static str },
    #[error("unknown vehicle category: {value}")]
    UnknownCategory { value: String },
    #[error("unknown fuel type: {value}")]
    UnknownFuelType { value: String },
    #[error("vehicle must carry at least one category")]
    NoCategories,
    #[error("price matrix {axis} must not contain duplicates")]
    DuplicateAxisValue { axis: &'static str },
    #[error("price matrix must have {expected_rows} rows of {expected_columns} rates")]
    MatrixShape {
        expected_rows: usize,
        expected_columns: usize,
    },
}

impl CatalogueValidationError {
    /// Stable detail code used in API error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty { .. } => "empty_field",
            Self::TooLong { .. } => "too_long",
            Self::NotPositive { .. } => "not_positive",
            Self::UnknownCategory { .. } => "invalid_category",
            Self::UnknownFuelType { .. } => "invalid_fuel_type",
            Self::NoCategories => "missing_category",
            Self::DuplicateAxisValue { .. } => "duplicate_matrix_axis",
            Self::MatrixShape { .. } => "invalid_matrix_shape",
        }
    }
}

/// Maximum length of a brand name.
pub const BRAND_NAME_MAX: usize = 80;
/// Maximum length of a model or variant designation.
pub const MODEL_MAX: usize = 120;

/// Reject catalogue text longer than `max` characters.
pub(crate) fn check_length(
    value: &str,
    field: &'static str,
    max: usize,
) -> Result<(), CatalogueValidationError> {
    if value.chars().count() > max {
        return Err(CatalogueValidationError::TooLong { field, max });
    }
    Ok(())
}

/// Vehicle brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub logo_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Tag controlling which list views display a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCategory {
    /// Public offers for brokers and their customers.
    Regular,
    /// Company-car offers for employees.
    Company,
    /// Salary-conversion offers for employees on the salary portal.
    Salary,
}

impl VehicleCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Company => "company",
            Self::Salary => "salary",
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleCategory {
    type Err = CatalogueValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(Self::Regular),
            "company" => Ok(Self::Company),
            "salary" => Ok(Self::Salary),
            other => Err(CatalogueValidationError::UnknownCategory {
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Petrol,
    Diesel,
    Hybrid,
    PlugInHybrid,
    Electric,
}

impl FuelType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Petrol => "petrol",
            Self::Diesel => "diesel",
            Self::Hybrid => "hybrid",
            Self::PlugInHybrid => "plug_in_hybrid",
            Self::Electric => "electric",
        }
    }
}

impl FromStr for FuelType {
    type Err = CatalogueValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "petrol" => Ok(Self::Petrol),
            "diesel" => Ok(Self::Diesel),
            "hybrid" => Ok(Self::Hybrid),
            "plug_in_hybrid" => Ok(Self::PlugInHybrid),
            "electric" => Ok(Self::Electric),
            other => Err(CatalogueValidationError::UnknownFuelType {
                value: other.to_owned(),
            }),
        }
    }
}

/// Monthly leasing rates by contract duration and annual mileage.
///
/// ## Invariants
/// - `durations_months` and `annual_mileages_km` are non-empty, positive and
///   free of duplicates.
/// - `monthly_rates_cents` has one row per duration and one column per
///   mileage; every rate is positive.
///
/// # Examples
/// ```
/// use fleet_backend::domain::PriceMatrix;
///
/// let matrix = PriceMatrix::new(
///     vec![24, 36],
///     vec![10_000, 15_000],
///     vec![vec![39_900, 42_900], vec![34_900, 37_900]],
/// )
/// .expect("valid matrix");
/// assert_eq!(matrix.lowest_monthly_rate(), Some(34_900));
/// assert_eq!(matrix.rate_for(24, 15_000), Some(42_900));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "PriceMatrixDto", into = "PriceMatrixDto")]
pub struct PriceMatrix {
    durations_months: Vec<u16>,
    annual_mileages_km: Vec<u32>,
    monthly_rates_cents: Vec<Vec<i64>>,
}

impl PriceMatrix {
    /// Validate and build a matrix.
    pub fn new(
        durations_months: Vec<u16>,
        annual_mileages_km: Vec<u32>,
        monthly_rates_cents: Vec<Vec<i64>>,
    ) -> Result<Self, CatalogueValidationError> {
        validate_axis(&durations_months, "durations")?;
        validate_axis(&annual_mileages_km, "mileages")?;
        let shape_error = CatalogueValidationError::MatrixShape {
            expected_rows: durations_months.len(),
            expected_columns: annual_mileages_km.len(),
        };
        if monthly_rates_cents.len() != durations_months.len()
            || monthly_rates_cents
                .iter()
                .any(|row| row.len() != annual_mileages_km.len())
        {
            return Err(shape_error);
        }
        if monthly_rates_cents.iter().flatten().any(|rate| *rate <= 0) {
            return Err(CatalogueValidationError::NotPositive {
                field: "monthlyRatesCents",
            });
        }
        Ok(Self {
            durations_months,
            annual_mileages_km,
            monthly_rates_cents,
        })
    }

    pub fn durations_months(&self) -> &[u16] {
        &self.durations_months
    }

    pub fn annual_mileages_km(&self) -> &[u32] {
        &self.annual_mileages_km
    }

    pub fn monthly_rates_cents(&self) -> &[Vec<i64>] {
        &self.monthly_rates_cents
    }

    /// Cheapest monthly rate, shown as the "from" price in list views.
    pub fn lowest_monthly_rate(&self) -> Option<i64> {
        self.monthly_rates_cents.iter().flatten().copied().min()
    }

    /// Exact rate for a duration/mileage combination.
    pub fn rate_for(&self, duration_months: u16, annual_mileage_km: u32) -> Option<i64> {
        let row = self
            .durations_months
            .iter()
            .position(|value| *value == duration_months)?;
        let column = self
            .annual_mileages_km
            .iter()
            .position(|value| *value == annual_mileage_km)?;
        self.monthly_rates_cents
            .get(row)
            .and_then(|rates| rates.get(column))
            .copied()
    }
}

fn validate_axis<T>(values: &[T], axis: &'static str) -> Result<(), CatalogueValidationError>
where
    T: Copy + Ord + Default,
{
    if values.is_empty() {
        return Err(CatalogueValidationError::Empty { field: axis });
    }
    if values.iter().any(|value| *value <= T::default()) {
        return Err(CatalogueValidationError::NotPositive { field: axis });
    }
    let unique: BTreeSet<T> = values.iter().copied().collect();
    if unique.len() != values.len() {
        return Err(CatalogueValidationError::DuplicateAxisValue { axis });
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceMatrixDto {
    durations_months: Vec<u16>,
    annual_mileages_km: Vec<u32>,
    monthly_rates_cents: Vec<Vec<i64>>,
}

impl From<PriceMatrix> for PriceMatrixDto {
    fn from(value: PriceMatrix) -> Self {
        Self {
            durations_months: value.durations_months,
            annual_mileages_km: value.annual_mileages_km,
            monthly_rates_cents: value.monthly_rates_cents,
        }
    }
}

impl TryFrom<PriceMatrixDto> for PriceMatrix {
    type Error = CatalogueValidationError;

    fn try_from(value: PriceMatrixDto) -> Result<Self, Self::Error> {
        Self::new(
            value.durations_months,
            value.annual_mileages_km,
            value.monthly_rates_cents,
        )
    }
}

/// Vehicle offer document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: VehicleId,
    pub brand_id: BrandId,
    pub model: String,
    pub variant: Option<String>,
    pub fuel_type: FuelType,
    pub power_kw: Option<u32>,
    pub list_price_cents: i64,
    pub categories: BTreeSet<VehicleCategory>,
    pub price_matrix: PriceMatrix,
    pub image_keys: Vec<String>,
    pub description: Option<String>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Whether any of the vehicle's categories is in `visible`.
    pub fn is_visible_in(&self, visible: &[VehicleCategory]) -> bool {
        visible
            .iter()
            .any(|category| self.categories.contains(category))
    }
}

/// Keep vehicles tagged with at least one of `visible`.
pub fn filter_by_categories(vehicles: Vec<Vehicle>, visible: &[VehicleCategory]) -> Vec<Vehicle> {
    vehicles
        .into_iter()
        .filter(|vehicle| vehicle.is_visible_in(visible))
        .collect()
}

/// Validated vehicle input for create and update operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleDraft {
    pub brand_id: BrandId,
    pub model: String,
    pub variant: Option<String>,
    pub fuel_type: FuelType,
    pub power_kw: Option<u32>,
    pub list_price_cents: i64,
    pub categories: BTreeSet<VehicleCategory>,
    pub price_matrix: PriceMatrix,
    pub image_keys: Vec<String>,
    pub description: Option<String>,
    pub available: bool,
}

impl VehicleDraft {
    /// Check the invariants that cannot be expressed in field types.
    pub fn validate(self) -> Result<Self, CatalogueValidationError> {
        let model = self.model.trim();
        if model.is_empty() {
            return Err(CatalogueValidationError::Empty { field: "model" });
        }
        check_length(model, "model", MODEL_MAX)?;
        let variant = trim_optional(self.variant);
        if let Some(variant) = &variant {
            check_length(variant, "variant", MODEL_MAX)?;
        }
        if self.list_price_cents <= 0 {
            return Err(CatalogueValidationError::NotPositive {
                field: "listPriceCents",
            });
        }
        if self.categories.is_empty() {
            return Err(CatalogueValidationError::NoCategories);
        }
        Ok(Self {
            model: model.to_owned(),
            variant,
            description: trim_optional(self.description),
            ..self
        })
    }
}

pub(crate) fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn matrix() -> PriceMatrix {
        PriceMatrix::new(
            vec![24, 36, 48],
            vec![10_000, 20_000],
            vec![
                vec![45_000, 49_000],
                vec![41_000, 44_500],
                vec![38_900, 42_000],
            ],
        )
        .expect("valid matrix")
    }

    fn vehicle(categories: &[VehicleCategory], matrix: PriceMatrix) -> Vehicle {
        Vehicle {
            id: VehicleId::random(),
            brand_id: BrandId::random(),
            model: "ID.4".into(),
            variant: None,
            fuel_type: FuelType::Electric,
            power_kw: Some(150),
            list_price_cents: 4_500_000,
            categories: categories.iter().copied().collect(),
            price_matrix: matrix,
            image_keys: Vec::new(),
            description: None,
            available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn lowest_rate_is_matrix_minimum(matrix: PriceMatrix) {
        assert_eq!(matrix.lowest_monthly_rate(), Some(38_900));
    }

    #[rstest]
    #[case(36, 20_000, Some(44_500))]
    #[case(48, 10_000, Some(38_900))]
    #[case(12, 10_000, None)]
    #[case(24, 15_000, None)]
    fn rate_lookup_is_exact(
        matrix: PriceMatrix,
        #[case] duration: u16,
        #[case] mileage: u32,
        #[case] expected: Option<i64>,
    ) {
        assert_eq!(matrix.rate_for(duration, mileage), expected);
    }

    #[rstest]
    #[case(vec![], vec![10_000], vec![], "empty_field")]
    #[case(vec![24, 24], vec![10_000], vec![vec![1], vec![1]], "duplicate_matrix_axis")]
    #[case(vec![24], vec![10_000, 20_000], vec![vec![1]], "invalid_matrix_shape")]
    #[case(vec![24], vec![10_000], vec![vec![0]], "not_positive")]
    #[case(vec![0], vec![10_000], vec![vec![1]], "not_positive")]
    fn malformed_matrices_are_rejected(
        #[case] durations: Vec<u16>,
        #[case] mileages: Vec<u32>,
        #[case] rates: Vec<Vec<i64>>,
        #[case] code: &str,
    ) {
        let err = PriceMatrix::new(durations, mileages, rates).expect_err("invalid matrix");
        assert_eq!(err.code(), code);
    }

    #[rstest]
    fn matrix_deserialisation_validates_shape() {
        let raw = serde_json::json!({
            "durationsMonths": [24, 36],
            "annualMileagesKm": [10000],
            "monthlyRatesCents": [[30000]],
        });
        assert!(serde_json::from_value::<PriceMatrix>(raw).is_err());
    }

    #[rstest]
    fn category_filter_keeps_intersecting_vehicles(matrix: PriceMatrix) {
        let salary = vehicle(&[VehicleCategory::Salary], matrix.clone());
        let company = vehicle(&[VehicleCategory::Company], matrix.clone());
        let both = vehicle(
            &[VehicleCategory::Regular, VehicleCategory::Salary],
            matrix,
        );
        let ids = [salary.id, both.id];

        let visible = filter_by_categories(
            vec![salary, company, both],
            &[VehicleCategory::Salary],
        );

        let visible_ids: Vec<_> = visible.iter().map(|vehicle| vehicle.id).collect();
        assert_eq!(visible_ids, ids);
    }

    #[rstest]
    fn draft_validation_trims_and_requires_categories(matrix: PriceMatrix) {
        let draft = VehicleDraft {
            brand_id: BrandId::random(),
            model: "  Golf ".into(),
            variant: Some("   ".into()),
            fuel_type: FuelType::Petrol,
            power_kw: None,
            list_price_cents: 3_000_000,
            categories: BTreeSet::new(),
            price_matrix: matrix,
            image_keys: Vec::new(),
            description: None,
            available: true,
        };
        assert_eq!(
            draft.clone().validate(),
            Err(CatalogueValidationError::NoCategories)
        );

        let mut with_category = draft;
        with_category.categories.insert(VehicleCategory::Regular);
        let valid = with_category.validate().expect("valid draft");
        assert_eq!(valid.model, "Golf");
        assert_eq!(valid.variant, None);
    }

    #[rstest]
    #[case("x".repeat(MODEL_MAX + 1), None, "model")]
    #[case("Golf".to_owned(), Some("x".repeat(MODEL_MAX + 1)), "variant")]
    fn draft_validation_caps_designations(
        matrix: PriceMatrix,
        #[case] model: String,
        #[case] variant: Option<String>,
        #[case] field: &'static str,
    ) {
        let draft = VehicleDraft {
            brand_id: BrandId::random(),
            model,
            variant,
            fuel_type: FuelType::Petrol,
            power_kw: None,
            list_price_cents: 3_000_000,
            categories: BTreeSet::from([VehicleCategory::Regular]),
            price_matrix: matrix,
            image_keys: Vec::new(),
            description: None,
            available: true,
        };
        let err = draft.validate().expect_err("overlong designation");
        assert_eq!(err, CatalogueValidationError::TooLong { field, max: MODEL_MAX });
        assert_eq!(err.code(), "too_long");
    }
}
