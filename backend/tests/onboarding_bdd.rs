//! Behaviour tests for employee onboarding by invitation.
//!
//! Scenarios drive the onboarding service over the in-memory store: an
//! administrator invites, the invitee follows the e-mailed link, and the
//! link is rejected once consumed or expired.

use std::cell::RefCell;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Local, Utc};
use fleet_backend::domain::ports::{EmailTemplate, FixturePasswordHasher};
use fleet_backend::domain::{
    CompanyDraft, CompanyId, EmailAddress, EmployeeInvitation, Error, LoginCredentials,
    NewPassword, PortalLinks, PortalType, Principal, Registration,
};
use fleet_backend::inbound::http::state::{HttpState, HttpStatePorts, SharedInfrastructure};
use fleet_backend::outbound::memory::{MemoryFileStorage, MemoryStore, RecordingMailer};
use mockable::Clock;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use tokio::runtime::Runtime;
use url::Url;

const ADMIN_EMAIL: &str = "admin@portal.example";
const ADMIN_PASSWORD: &str = "verwaltung2024";

/// Clock the scenarios can move forward.
struct ShiftableClock(Mutex<DateTime<Utc>>);

impl ShiftableClock {
    fn advance(&self, delta: Duration) {
        let mut now = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *now += delta;
    }
}

impl Clock for ShiftableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        match self.0.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

struct OnboardingWorld {
    runtime: Runtime,
    state: HttpState,
    mailer: Arc<RecordingMailer>,
    clock: Arc<ShiftableClock>,
    admin: RefCell<Option<Principal>>,
    company: RefCell<Option<CompanyId>>,
    token: RefCell<Option<String>>,
    registration: RefCell<Option<Result<Principal, Error>>>,
    invitation_error: RefCell<Option<Error>>,
}

impl OnboardingWorld {
    fn new() -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime");
        let mailer = Arc::new(RecordingMailer::new());
        let clock = Arc::new(ShiftableClock(Mutex::new(Utc::now())));
        let ports = HttpStatePorts::from_store(
            Arc::new(MemoryStore::new()),
            SharedInfrastructure {
                storage: Arc::new(MemoryFileStorage::new()),
                hasher: Arc::new(FixturePasswordHasher),
                mailer: mailer.clone(),
                clock: clock.clone(),
            },
        );
        let links = PortalLinks::new(Url::parse("https://portal.example/").expect("url"));
        Self {
            runtime,
            state: HttpState::new(ports, links),
            mailer,
            clock,
            admin: RefCell::new(None),
            company: RefCell::new(None),
            token: RefCell::new(None),
            registration: RefCell::new(None),
            invitation_error: RefCell::new(None),
        }
    }

    fn admin(&self) -> Principal {
        self.admin.borrow().clone().expect("administrator signed in")
    }

    fn invite(&self, email: &str, portal_type: &str) -> Result<(), Error> {
        let request = EmployeeInvitation {
            email: EmailAddress::new(email).expect("email"),
            company_id: self.company.borrow().expect("company created"),
            portal_type: portal_type.parse::<PortalType>().expect("portal type"),
        };
        let admin = self.admin();
        self.runtime
            .block_on(self.state.onboarding.invite_employee(&admin, request))
            .map(|_| ())
    }

    fn register(&self, password: &str) {
        let registration = Registration {
            token: self.token.borrow().clone().expect("invitation token"),
            password: NewPassword::new(password).expect("password"),
            first_name: "Lena".to_owned(),
            last_name: "Vogel".to_owned(),
            phone: None,
        };
        let outcome = self
            .runtime
            .block_on(self.state.onboarding.register(registration));
        *self.registration.borrow_mut() = Some(outcome);
    }

    fn registration_error(&self) -> Error {
        match self.registration.borrow().as_ref().expect("registration attempted") {
            Ok(_) => panic!("expected registration to fail"),
            Err(error) => error.clone(),
        }
    }
}

fn token_from_link(link: &Value) -> String {
    let link = link.as_str().expect("link param");
    Url::parse(link)
        .expect("absolute link")
        .query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .expect("token query")
}

#[fixture]
fn world() -> OnboardingWorld {
    OnboardingWorld::new()
}

#[given("an administrator managing the company \"{name}\"")]
fn an_administrator_managing_the_company(world: &OnboardingWorld, name: String) {
    let email = EmailAddress::new(ADMIN_EMAIL).expect("admin email");
    let password = NewPassword::new(ADMIN_PASSWORD).expect("admin password");
    let onboarding = world.state.onboarding.clone();
    world
        .runtime
        .block_on(onboarding.bootstrap_admin(&email, &password))
        .expect("bootstrap admin");
    let credentials =
        LoginCredentials::try_from_parts(ADMIN_EMAIL, ADMIN_PASSWORD).expect("credentials");
    let admin = world
        .runtime
        .block_on(world.state.auth.login(&credentials))
        .expect("admin login");
    let draft = CompanyDraft::new(&name, None, None, Some("Köln".to_owned()), None)
        .expect("company draft");
    let company = world
        .runtime
        .block_on(world.state.organisations.create_company(&admin, draft))
        .expect("company created");
    *world.company.borrow_mut() = Some(company.id);
    *world.admin.borrow_mut() = Some(admin);
}

#[given("an employee invitation for \"{email}\" with portal type {portal_type}")]
fn an_employee_invitation(world: &OnboardingWorld, email: String, portal_type: String) {
    world.invite(&email, &portal_type).expect("invitation sent");
    let message = world
        .mailer
        .last_of(EmailTemplate::EmployeeInvitation)
        .expect("invitation e-mail");
    let token = token_from_link(message.params.get("link").expect("link"));
    *world.token.borrow_mut() = Some(token);
}

#[given("{hours} hours pass")]
fn hours_pass(world: &OnboardingWorld, hours: i64) {
    world.clock.advance(Duration::hours(hours));
}

#[given("the invitee registers with password \"{password}\"")]
fn the_invitee_registered(world: &OnboardingWorld, password: String) {
    world.register(&password);
    assert!(
        matches!(world.registration.borrow().as_ref(), Some(Ok(_))),
        "first registration should succeed"
    );
}

#[when("the invitee registers with password \"{password}\"")]
fn the_invitee_registers(world: &OnboardingWorld, password: String) {
    world.register(&password);
}

#[when("the administrator invites \"{email}\" with portal type {portal_type}")]
fn the_administrator_invites(world: &OnboardingWorld, email: String, portal_type: String) {
    *world.invitation_error.borrow_mut() = world.invite(&email, &portal_type).err();
}

#[then("the new account has permission {permission}")]
fn the_new_account_has_permission(world: &OnboardingWorld, permission: String) {
    let registration = world.registration.borrow();
    let principal = match registration.as_ref().expect("registration attempted") {
        Ok(principal) => principal,
        Err(error) => panic!("registration failed: {error}"),
    };
    assert_eq!(principal.permission.as_str(), permission);
    assert_eq!(principal.profile.company_id, *world.company.borrow());
}

#[then("a welcome e-mail was sent to \"{email}\"")]
fn a_welcome_email_was_sent(world: &OnboardingWorld, email: String) {
    let welcome = world
        .mailer
        .last_of(EmailTemplate::Welcome)
        .expect("welcome e-mail");
    assert_eq!(welcome.to.as_ref(), email);
}

#[then("registration fails with {code} and detail {detail}")]
fn registration_fails(world: &OnboardingWorld, code: String, detail: String) {
    let error = world.registration_error();
    assert_eq!(error.code().as_str(), code);
    assert_eq!(error.detail_code(), Some(detail.as_str()));
}

#[then("the invitation fails with {code} and detail {detail}")]
fn the_invitation_fails(world: &OnboardingWorld, code: String, detail: String) {
    let error = world
        .invitation_error
        .borrow()
        .clone()
        .expect("invitation should fail");
    assert_eq!(error.code().as_str(), code);
    assert_eq!(error.detail_code(), Some(detail.as_str()));
}

#[scenario(path = "tests/features/onboarding.feature")]
fn onboarding_scenarios(world: OnboardingWorld) {
    drop(world);
}
