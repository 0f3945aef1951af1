//! Order placement, visibility and status updates.

use std::collections::BTreeSet;
use std::sync::Arc;

use rstest::{fixture, rstest};
use url::Url;

use super::*;
use crate::domain::ports::{MockUserRepository, RepositoryError};
use crate::domain::test_support::{MutableClock, broker, customer, fixed_now, principal};
use crate::domain::{
    BrokerId, ErrorCode, FuelType, PriceMatrix, Role, StepState, Vehicle, VehicleCategory,
    VehicleDraft,
};
use crate::outbound::memory::{MemoryStore, RecordingMailer};

struct Harness {
    store: Arc<MemoryStore>,
    mailer: Arc<RecordingMailer>,
    catalogue: CatalogueService,
    service: OrderService,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(RecordingMailer::new());
    let clock: Arc<dyn Clock> = Arc::new(MutableClock::new(fixed_now()));
    let catalogue = CatalogueService::new(store.clone(), clock.clone());
    let deps = OrderDeps {
        orders: store.clone(),
        users: store.clone(),
        mailer: mailer.clone(),
        clock,
    };
    let links = PortalLinks::new(Url::parse("https://portal.example").expect("url"));
    Harness {
        store,
        mailer,
        service: OrderService::new(deps, catalogue.clone(), links),
        catalogue,
    }
}

async fn vehicle(harness: &Harness, available: bool) -> Vehicle {
    let admin = principal(Role::Admin);
    let brand = harness
        .catalogue
        .create_brand(&admin, "Cupra", None)
        .await
        .expect("brand");
    harness
        .catalogue
        .create_vehicle(
            &admin,
            VehicleDraft {
                brand_id: brand.id,
                model: "Born".into(),
                variant: None,
                fuel_type: FuelType::Electric,
                power_kw: Some(170),
                list_price_cents: 4_200_000,
                categories: BTreeSet::from([VehicleCategory::Regular]),
                price_matrix: PriceMatrix::new(vec![36, 48], vec![10_000], vec![vec![41_900], vec![38_900]])
                    .expect("matrix"),
                image_keys: vec![],
                description: None,
                available,
            },
        )
        .await
        .expect("vehicle")
}

fn request(vehicle_id: VehicleId) -> OrderRequest {
    OrderRequest {
        vehicle_id,
        duration_months: 48,
        annual_mileage_km: 10_000,
        notes: Some("  Lieferung bitte im Juni ".into()),
    }
}

#[rstest]
#[tokio::test]
async fn order_takes_rate_and_links_from_caller(harness: Harness) {
    let car = vehicle(&harness, true).await;
    let broker_id = BrokerId::random();
    let buyer = customer(broker_id);

    let order = harness
        .service
        .create(&buyer, request(car.id))
        .await
        .expect("order");

    assert_eq!(order.monthly_rate_cents, 38_900);
    assert_eq!(order.broker_id, Some(broker_id));
    assert_eq!(order.status, OrderStatus::CreditCheckStarted);
    assert_eq!(order.notes.as_deref(), Some("Lieferung bitte im Juni"));
    assert_eq!(order.timeline()[0].state, StepState::Current);
}

#[rstest]
#[tokio::test]
async fn unavailable_vehicles_cannot_be_ordered(harness: Harness) {
    let car = vehicle(&harness, false).await;
    let err = harness
        .service
        .create(&principal(Role::Customer), request(car.id))
        .await
        .expect_err("unavailable");
    assert_eq!(err.detail_code(), Some("vehicle_unavailable"));
}

#[rstest]
#[tokio::test]
async fn employees_cannot_order_regular_vehicles(harness: Harness) {
    let car = vehicle(&harness, true).await;
    let err = harness
        .service
        .create(&principal(Role::Employee), request(car.id))
        .await
        .expect_err("not visible");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn visibility_follows_role(harness: Harness) {
    let car = vehicle(&harness, true).await;
    let broker_id = BrokerId::random();
    let mine = customer(broker_id);
    let stranger = customer(BrokerId::random());
    let order = harness
        .service
        .create(&mine, request(car.id))
        .await
        .expect("order");
    harness
        .service
        .create(&stranger, request(car.id))
        .await
        .expect("order");

    assert_eq!(harness.service.list(&mine).await.expect("list").len(), 1);
    assert_eq!(
        harness
            .service
            .list(&broker(broker_id))
            .await
            .expect("list")
            .len(),
        1
    );
    assert_eq!(
        harness
            .service
            .list(&principal(Role::Admin))
            .await
            .expect("list")
            .len(),
        2
    );
    let err = harness
        .service
        .get(&stranger, &order.id)
        .await
        .expect_err("hidden");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn broker_advances_own_order_and_customer_is_notified(harness: Harness) {
    let car = vehicle(&harness, true).await;
    let broker_id = BrokerId::random();
    let buyer = customer(broker_id);
    harness
        .store
        .insert(&buyer.profile, "hash")
        .await
        .expect("seed customer");
    let order = harness
        .service
        .create(&buyer, request(car.id))
        .await
        .expect("order");

    let updated = harness
        .service
        .update_status(&broker(broker_id), &order.id, OrderStatus::ContractCreated)
        .await
        .expect("update");

    assert_eq!(updated.status_history.len(), 2);
    let timeline = updated.timeline();
    assert_eq!(timeline[1].state, StepState::Completed);
    assert_eq!(timeline[2].state, StepState::Current);
    let mail = harness
        .mailer
        .last_of(EmailTemplate::OrderStatusChanged)
        .expect("notification");
    assert_eq!(mail.to, buyer.profile.email);
    assert_eq!(mail.params["status"], "contract_created");
}

#[rstest]
#[tokio::test]
async fn status_change_stands_when_orderer_lookup_fails(harness: Harness) {
    let car = vehicle(&harness, true).await;
    let buyer = customer(BrokerId::random());
    let order = harness
        .service
        .create(&buyer, request(car.id))
        .await
        .expect("order");

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .times(1)
        .returning(|_| Err(RepositoryError::connection("db down")));
    let service = OrderService::new(
        OrderDeps {
            orders: harness.store.clone(),
            users: Arc::new(users),
            mailer: harness.mailer.clone(),
            clock: Arc::new(MutableClock::new(fixed_now())),
        },
        harness.catalogue.clone(),
        PortalLinks::new(Url::parse("https://portal.example").expect("url")),
    );

    let updated = service
        .update_status(
            &principal(Role::Admin),
            &order.id,
            OrderStatus::CreditCheckApproved,
        )
        .await
        .expect("status change is committed");

    assert_eq!(updated.status, OrderStatus::CreditCheckApproved);
    let stored = harness
        .service
        .get(&principal(Role::Admin), &order.id)
        .await
        .expect("stored order");
    assert_eq!(stored.status, OrderStatus::CreditCheckApproved);
    assert_eq!(stored.status_history.len(), 2);
    assert!(
        harness
            .mailer
            .last_of(EmailTemplate::OrderStatusChanged)
            .is_none()
    );
}

#[rstest]
#[tokio::test]
async fn customers_cannot_change_status(harness: Harness) {
    let car = vehicle(&harness, true).await;
    let buyer = customer(BrokerId::random());
    let order = harness
        .service
        .create(&buyer, request(car.id))
        .await
        .expect("order");

    let err = harness
        .service
        .update_status(&buyer, &order.id, OrderStatus::Delivered)
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn only_admins_delete_orders(harness: Harness) {
    let car = vehicle(&harness, true).await;
    let buyer = customer(BrokerId::random());
    let order = harness
        .service
        .create(&buyer, request(car.id))
        .await
        .expect("order");

    let err = harness
        .service
        .delete(&buyer, &order.id)
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    harness
        .service
        .delete(&principal(Role::Admin), &order.id)
        .await
        .expect("delete");
    assert!(
        harness
            .service
            .list(&principal(Role::Admin))
            .await
            .expect("list")
            .is_empty()
    );
}
