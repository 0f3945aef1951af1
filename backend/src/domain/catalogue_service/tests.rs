//! Catalogue visibility, guards and quotes.

use std::collections::BTreeSet;
use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::test_support::{MutableClock, employee, fixed_now, principal};
use crate::domain::{CompanyId, ErrorCode, FuelType, PortalType, PriceMatrix, Role};
use crate::outbound::memory::MemoryStore;

struct Harness {
    service: CatalogueService,
    admin: Principal,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(MutableClock::new(fixed_now()));
    Harness {
        service: CatalogueService::new(store, clock),
        admin: principal(Role::Admin),
    }
}

fn draft(brand_id: BrandId, categories: &[VehicleCategory]) -> VehicleDraft {
    VehicleDraft {
        brand_id,
        model: "Enyaq".into(),
        variant: Some("iV 80".into()),
        fuel_type: FuelType::Electric,
        power_kw: Some(150),
        list_price_cents: 4_990_000,
        categories: categories.iter().copied().collect::<BTreeSet<_>>(),
        price_matrix: PriceMatrix::new(
            vec![24, 36],
            vec![10_000, 15_000],
            vec![vec![52_900, 55_900], vec![48_900, 51_900]],
        )
        .expect("matrix"),
        image_keys: Vec::new(),
        description: None,
        available: true,
    }
}

async fn seed(harness: &Harness, categories: &[VehicleCategory]) -> Vehicle {
    let brand = harness
        .service
        .create_brand(&harness.admin, "Skoda", None)
        .await
        .expect("brand");
    harness
        .service
        .create_vehicle(&harness.admin, draft(brand.id, categories))
        .await
        .expect("vehicle")
}

#[rstest]
#[tokio::test]
async fn employees_only_see_their_portal(harness: Harness) {
    let salary = seed(&harness, &[VehicleCategory::Salary]).await;
    let company = seed(&harness, &[VehicleCategory::Company]).await;
    let regular = seed(&harness, &[VehicleCategory::Regular]).await;

    let salary_employee = employee(CompanyId::random(), PortalType::Salary);
    let ids: Vec<_> = harness
        .service
        .list_vehicles(&salary_employee, None)
        .await
        .expect("list")
        .into_iter()
        .map(|vehicle| vehicle.id)
        .collect();
    assert_eq!(ids, [salary.id]);

    let normal_employee = employee(CompanyId::random(), PortalType::Normal);
    let visible = harness
        .service
        .list_vehicles(&normal_employee, None)
        .await
        .expect("list");
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, company.id);

    let customer = principal(Role::Customer);
    let visible = harness
        .service
        .list_vehicles(&customer, None)
        .await
        .expect("list");
    assert_eq!(visible[0].id, regular.id);
}

#[rstest]
#[tokio::test]
async fn admin_filters_by_category(harness: Harness) {
    seed(&harness, &[VehicleCategory::Salary]).await;
    seed(&harness, &[VehicleCategory::Company, VehicleCategory::Regular]).await;

    let all = harness
        .service
        .list_vehicles(&harness.admin, None)
        .await
        .expect("list");
    assert_eq!(all.len(), 2);

    let regular = harness
        .service
        .list_vehicles(&harness.admin, Some(VehicleCategory::Regular))
        .await
        .expect("list");
    assert_eq!(regular.len(), 1);
}

#[rstest]
#[tokio::test]
async fn hidden_vehicles_are_not_found(harness: Harness) {
    let salary = seed(&harness, &[VehicleCategory::Salary]).await;
    let err = harness
        .service
        .get_vehicle(&principal(Role::Broker), &salary.id)
        .await
        .expect_err("hidden");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn quote_uses_exact_matrix_cell(harness: Harness) {
    let vehicle = seed(&harness, &[VehicleCategory::Regular]).await;
    let quote = harness
        .service
        .quote(&principal(Role::Customer), &vehicle.id, 36, 15_000)
        .await
        .expect("quote");
    assert_eq!(quote.monthly_rate_cents, 51_900);

    let err = harness
        .service
        .quote(&principal(Role::Customer), &vehicle.id, 48, 15_000)
        .await
        .expect_err("not offered");
    assert_eq!(err.detail_code(), Some("rate_not_offered"));
}

#[rstest]
#[case(Role::Broker)]
#[case(Role::Customer)]
#[case(Role::Employee)]
#[tokio::test]
async fn only_admins_mutate_catalogue(harness: Harness, #[case] role: Role) {
    let err = harness
        .service
        .create_brand(&principal(role), "BMW", None)
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[case(BRAND_NAME_MAX, true)]
#[case(BRAND_NAME_MAX + 1, false)]
#[tokio::test]
async fn brand_names_fit_the_column(harness: Harness, #[case] len: usize, #[case] fits: bool) {
    let result = harness
        .service
        .create_brand(&harness.admin, &"B".repeat(len), None)
        .await;
    if fits {
        result.expect("name at the limit");
    } else {
        let err = result.expect_err("overlong name");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.detail_code(), Some("too_long"));
    }
}

#[rstest]
#[tokio::test]
async fn vehicles_need_an_existing_brand(harness: Harness) {
    let err = harness
        .service
        .create_vehicle(&harness.admin, draft(BrandId::random(), &[VehicleCategory::Regular]))
        .await
        .expect_err("unknown brand");
    assert_eq!(err.detail_code(), Some("unknown_brand"));
}

#[rstest]
#[tokio::test]
async fn brands_in_use_cannot_be_deleted(harness: Harness) {
    let vehicle = seed(&harness, &[VehicleCategory::Regular]).await;
    let err = harness
        .service
        .delete_brand(&harness.admin, &vehicle.brand_id)
        .await
        .expect_err("in use");
    assert_eq!(err.code(), ErrorCode::Conflict);

    harness
        .service
        .delete_vehicle(&harness.admin, &vehicle.id)
        .await
        .expect("delete vehicle");
    harness
        .service
        .delete_brand(&harness.admin, &vehicle.brand_id)
        .await
        .expect("delete brand");
}

#[rstest]
#[tokio::test]
async fn update_keeps_identity_and_creation_time(harness: Harness) {
    let vehicle = seed(&harness, &[VehicleCategory::Regular]).await;
    let mut changed = draft(vehicle.brand_id, &[VehicleCategory::Company]);
    changed.available = false;

    let updated = harness
        .service
        .update_vehicle(&harness.admin, &vehicle.id, changed)
        .await
        .expect("update");

    assert_eq!(updated.id, vehicle.id);
    assert_eq!(updated.created_at, vehicle.created_at);
    assert!(!updated.available);
    assert!(updated.categories.contains(&VehicleCategory::Company));
}
