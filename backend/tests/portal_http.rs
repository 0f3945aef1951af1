//! End-to-end HTTP flows against the in-memory portal.
//!
//! Each test wires the public `/api/v1` surface over the memory store and a
//! recording mailer, then drives it the way the browser client does: sign
//! in, follow e-mailed links, and reuse the session cookie.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::{App, test, web};
use fleet_backend::Trace;
use fleet_backend::domain::ports::{EmailTemplate, FixturePasswordHasher};
use fleet_backend::domain::{EmailAddress, NewPassword, PortalLinks, TRACE_ID_HEADER};
use fleet_backend::inbound::http::configure_api;
use fleet_backend::inbound::http::state::{HttpState, HttpStatePorts, SharedInfrastructure};
use fleet_backend::outbound::memory::{MemoryFileStorage, MemoryStore, RecordingMailer};
use serde_json::{Value, json};
use url::Url;

const ADMIN_EMAIL: &str = "admin@portal.example";
const ADMIN_PASSWORD: &str = "verwaltung2024";
const EMPLOYEE_PASSWORD: &str = "dienstwagen!";

struct Portal {
    state: HttpState,
    mailer: Arc<RecordingMailer>,
}

impl Portal {
    async fn with_admin() -> Self {
        let mailer = Arc::new(RecordingMailer::new());
        let ports = HttpStatePorts::from_store(
            Arc::new(MemoryStore::new()),
            SharedInfrastructure {
                storage: Arc::new(MemoryFileStorage::new()),
                hasher: Arc::new(FixturePasswordHasher),
                mailer: mailer.clone(),
                clock: Arc::new(mockable::DefaultClock),
            },
        );
        let links = PortalLinks::new(Url::parse("https://portal.example/").expect("url"));
        let state = HttpState::new(ports, links);
        let created = state
            .onboarding
            .bootstrap_admin(
                &EmailAddress::new(ADMIN_EMAIL).expect("admin email"),
                &NewPassword::new(ADMIN_PASSWORD).expect("admin password"),
            )
            .await
            .expect("bootstrap admin");
        assert!(created);
        Self { state, mailer }
    }

    fn token_of(&self, template: EmailTemplate) -> String {
        let message = self.mailer.last_of(template).expect("e-mail sent");
        let link = message
            .params
            .get("link")
            .and_then(Value::as_str)
            .expect("link param");
        Url::parse(link)
            .expect("absolute link")
            .query_pairs()
            .find(|(key, _)| key == "token")
            .map(|(_, value)| value.into_owned())
            .expect("token query")
    }
}

async fn init(
    portal: &Portal,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    test::init_service(
        App::new()
            .app_data(web::Data::new(portal.state.clone()))
            .wrap(Trace)
            .service(web::scope("/api/v1").wrap(session).configure(configure_api)),
    )
    .await
}

fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

async fn sign_in<S>(app: &S, email: &str, password: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let response = test::call_service(app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

async fn send<S>(
    app: &S,
    request: test::TestRequest,
    cookie: &Cookie<'static>,
) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = test::call_service(app, request.cookie(cookie.clone()).to_request()).await;
    let status = response.status();
    let body = test::read_body(response).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, json)
}

fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("id").to_owned()
}

fn vehicle(brand_id: &str, model: &str, category: &str) -> Value {
    json!({
        "brandId": brand_id,
        "model": model,
        "fuelType": "electric",
        "listPriceCents": 4_500_000,
        "categories": [category],
        "priceMatrix": {
            "durationsMonths": [24, 36],
            "annualMileagesKm": [10000, 15000],
            "monthlyRatesCents": [[52900, 55900], [44900, 47900]]
        }
    })
}

#[actix_web::test]
async fn invited_employee_orders_a_company_car() {
    let portal = Portal::with_admin().await;
    let app = init(&portal).await;
    let admin = sign_in(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, company) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/companies")
            .set_json(json!({ "name": "Muster GmbH", "city": "Köln" })),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let company_id = id_of(&company);

    let (_, brand) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/brands")
            .set_json(json!({ "name": "Volkswagen" })),
        &admin,
    )
    .await;
    let brand_id = id_of(&brand);
    let (status, company_car) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/vehicles")
            .set_json(vehicle(&brand_id, "ID.4", "company")),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let company_car_id = id_of(&company_car);
    send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/vehicles")
            .set_json(vehicle(&brand_id, "Golf", "regular")),
        &admin,
    )
    .await;

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/invites/employees")
            .set_json(json!({
                "email": "Anna.Schmidt@Muster.example",
                "companyId": company_id,
                "portalType": "normal"
            })),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = portal.token_of(EmailTemplate::EmployeeInvitation);

    let preview = test::TestRequest::get()
        .uri(&format!("/api/v1/verifications/{token}"))
        .to_request();
    let preview: Value = test::call_and_read_body_json(&app, preview).await;
    assert_eq!(preview["email"], "anna.schmidt@muster.example");
    assert_eq!(preview["role"], "employee");

    let registration = json!({
        "token": token,
        "password": EMPLOYEE_PASSWORD,
        "firstName": "Anna",
        "lastName": "Schmidt"
    });
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(&registration)
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let employee = session_cookie(&response);
    let registered: Value = test::read_body_json(response).await;
    assert_eq!(registered["permission"], "employee");
    assert_eq!(registered["profile"]["companyId"], company_id.as_str());
    assert!(portal.mailer.last_of(EmailTemplate::Welcome).is_some());

    let (_, vehicles) = send(
        &app,
        test::TestRequest::get().uri("/api/v1/vehicles"),
        &employee,
    )
    .await;
    let models: Vec<&str> = vehicles
        .as_array()
        .expect("vehicle list")
        .iter()
        .filter_map(|vehicle| vehicle["model"].as_str())
        .collect();
    assert_eq!(models, vec!["ID.4"]);

    let (status, quote) = send(
        &app,
        test::TestRequest::get().uri(&format!(
            "/api/v1/vehicles/{company_car_id}/quote?durationMonths=36&annualMileageKm=15000"
        )),
        &employee,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["monthlyRateCents"], 47900);

    let (status, order) = send(
        &app,
        test::TestRequest::post().uri("/api/v1/orders").set_json(json!({
            "vehicleId": company_car_id,
            "durationMonths": 36,
            "annualMileageKm": 15000
        })),
        &employee,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "credit_check_started");
    assert_eq!(order["monthlyRateCents"], 47900);
    assert_eq!(order["timeline"][0]["state"], "current");
    let order_id = id_of(&order);

    let (status, advanced) = send(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/orders/{order_id}/status"))
            .set_json(json!({ "status": "credit_check_approved" })),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(advanced["timeline"][0]["state"], "completed");
    assert_eq!(advanced["timeline"][1]["state"], "current");
    let notice = portal
        .mailer
        .last_of(EmailTemplate::OrderStatusChanged)
        .expect("status e-mail");
    assert_eq!(notice.to.as_ref(), "anna.schmidt@muster.example");

    let reuse = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(&registration)
            .to_request(),
    )
    .await;
    assert_eq!(reuse.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn guards_answer_401_then_403() {
    let portal = Portal::with_admin().await;
    let app = init(&portal).await;

    let anonymous = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/companies").to_request(),
    )
    .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    let header = anonymous
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = test::read_body_json(anonymous).await;
    assert_eq!(body["code"], "unauthorized");
    assert_eq!(body["traceId"], header.as_str());

    let admin = sign_in(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, broker) = send(
        &app,
        test::TestRequest::post().uri("/api/v1/brokers").set_json(json!({
            "companyName": "Autohaus Becker",
            "contactName": "Jonas Becker",
            "email": "jonas@becker.example"
        })),
        &admin,
    )
    .await;
    let token = portal.token_of(EmailTemplate::BrokerInvitation);
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "token": token,
                "password": "autohaus2024",
                "firstName": "Jonas",
                "lastName": "Becker"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let broker_session = session_cookie(&response);

    let (status, body) = send(
        &app,
        test::TestRequest::get().uri("/api/v1/companies"),
        &broker_session,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, own) = send(
        &app,
        test::TestRequest::get().uri("/api/v1/brokers/me"),
        &broker_session,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own["id"], broker["id"]);
}

#[actix_web::test]
async fn uploaded_files_are_served_to_signed_in_users() {
    let portal = Portal::with_admin().await;
    let app = init(&portal).await;
    let admin = sign_in(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let png = b"\x89PNG\r\n\x1a\nfake-image".to_vec();
    let (status, uploaded) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/uploads/vehicles")
            .insert_header((CONTENT_TYPE, "image/png"))
            .set_payload(png.clone()),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let key = uploaded["key"].as_str().expect("key").to_owned();
    assert!(key.starts_with("vehicles/"));

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/files/{key}"))
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("image/png")
    );
    assert!(response.headers().contains_key(CACHE_CONTROL));
    let body = test::read_body(response).await;
    assert_eq!(body.as_ref(), png.as_slice());

    let anonymous = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/files/{key}"))
            .to_request(),
    )
    .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let (status, rejected) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/uploads/vehicles")
            .insert_header((CONTENT_TYPE, "application/x-msdownload"))
            .set_payload(b"MZ".to_vec()),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected["code"], "invalid_request");
}

#[actix_web::test]
async fn overlong_fields_are_rejected_before_storage() {
    let portal = Portal::with_admin().await;
    let app = init(&portal).await;
    let admin = sign_in(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/brands")
            .set_json(json!({ "name": "V".repeat(81) })),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "too_long");
    assert_eq!(body["localizedMessage"], "Die Eingabe ist zu lang.");

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/companies")
            .set_json(json!({ "name": "Muster GmbH", "postalCode": "1".repeat(17) })),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], json!({ "field": "postalCode", "code": "too_long" }));
}
