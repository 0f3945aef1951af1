//! Invitation and registration flows.

use std::sync::Arc;

use chrono::Duration;
use rstest::{fixture, rstest};
use url::Url;

use super::*;
use crate::domain::ports::{
    FixturePasswordHasher, MailerError, MockMailer, MockUserRepository, RepositoryError,
};
use crate::domain::test_support::{MutableClock, broker, fixed_now, principal};
use crate::domain::{Company, ErrorCode, Permission};
use crate::outbound::memory::{MemoryStore, RecordingMailer};

struct Harness {
    store: Arc<MemoryStore>,
    mailer: Arc<RecordingMailer>,
    clock: Arc<MutableClock>,
    service: OnboardingService,
}

fn build(store: Arc<MemoryStore>, mailer: Arc<dyn Mailer>, clock: Arc<MutableClock>) -> OnboardingService {
    let deps = OnboardingDeps {
        users: store.clone(),
        invites: store.clone(),
        organisations: store.clone(),
        hasher: Arc::new(FixturePasswordHasher),
        mailer,
        clock,
    };
    OnboardingService::new(
        deps,
        SettingsService::new(store),
        PortalLinks::new(Url::parse("https://portal.example").expect("url")),
    )
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(RecordingMailer::new());
    let clock = Arc::new(MutableClock::new(fixed_now()));
    let service = build(store.clone(), mailer.clone(), clock.clone());
    Harness {
        store,
        mailer,
        clock,
        service,
    }
}

async fn seed_company(store: &MemoryStore) -> Company {
    let company = Company {
        id: CompanyId::random(),
        name: "Muster GmbH".into(),
        street: None,
        postal_code: None,
        city: None,
        contact_email: None,
        created_at: fixed_now(),
    };
    store.save_company(&company).await.expect("company");
    company
}

async fn seed_broker(store: &MemoryStore) -> Broker {
    let broker = Broker {
        id: BrokerId::random(),
        company_name: "Autohaus Nord".into(),
        contact_name: "Max Maier".into(),
        email: EmailAddress::new("max@autohaus-nord.de").expect("email"),
        phone: None,
        user_id: None,
        created_at: fixed_now(),
    };
    store.save_broker(&broker).await.expect("broker");
    broker
}

fn last_token(mailer: &RecordingMailer, template: EmailTemplate) -> String {
    let message = mailer.last_of(template).expect("invitation sent");
    let link = message.params["link"].as_str().expect("link").to_owned();
    let url = Url::parse(&link).expect("link url");
    url.query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .expect("token")
}

fn registration(token: String) -> Registration {
    Registration {
        token,
        password: NewPassword::new("Fuhrpark2024").expect("policy"),
        first_name: "Lea".into(),
        last_name: "Neumann".into(),
        phone: None,
    }
}

fn employee_invitation(company_id: CompanyId, portal_type: PortalType) -> EmployeeInvitation {
    EmployeeInvitation {
        email: EmailAddress::new("lea@muster.de").expect("email"),
        company_id,
        portal_type,
    }
}

#[rstest]
#[tokio::test]
async fn failed_account_insert_keeps_the_link_usable(harness: Harness) {
    let company = seed_company(&harness.store).await;
    harness
        .service
        .invite_employee(
            &principal(Role::Admin),
            employee_invitation(company.id, PortalType::Normal),
        )
        .await
        .expect("invite");
    let token = last_token(&harness.mailer, EmailTemplate::EmployeeInvitation);

    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));
    users
        .expect_insert()
        .times(1)
        .returning(|_, _| Err(RepositoryError::connection("db down")));
    let failing = OnboardingService::new(
        OnboardingDeps {
            users: Arc::new(users),
            invites: harness.store.clone(),
            organisations: harness.store.clone(),
            hasher: Arc::new(FixturePasswordHasher),
            mailer: harness.mailer.clone(),
            clock: harness.clock.clone(),
        },
        SettingsService::new(harness.store.clone()),
        PortalLinks::new(Url::parse("https://portal.example").expect("url")),
    );
    let err = failing
        .register(registration(token.clone()))
        .await
        .expect_err("insert fails");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);

    let account = harness
        .service
        .register(registration(token))
        .await
        .expect("retry with the same link");
    assert_eq!(account.permission, Permission::Employee);
}

#[rstest]
#[tokio::test]
async fn employee_registration_takes_role_from_invite(harness: Harness) {
    let company = seed_company(&harness.store).await;
    harness
        .service
        .invite_employee(
            &principal(Role::Admin),
            employee_invitation(company.id, PortalType::Salary),
        )
        .await
        .expect("invite");

    let token = last_token(&harness.mailer, EmailTemplate::EmployeeInvitation);
    let preview = harness.service.verify(&token).await.expect("verify");
    assert_eq!(preview.kind, "employee_invite");
    assert_eq!(preview.role, Role::Employee);

    let principal = harness
        .service
        .register(registration(token))
        .await
        .expect("register");

    assert_eq!(principal.permission, Permission::SalaryEmployee);
    assert_eq!(principal.profile.company_id, Some(company.id));
    assert_eq!(principal.profile.email.as_ref(), "lea@muster.de");
    assert!(harness.mailer.last_of(EmailTemplate::Welcome).is_some());
}

#[rstest]
#[tokio::test]
async fn tokens_cannot_be_reused(harness: Harness) {
    let company = seed_company(&harness.store).await;
    harness
        .service
        .invite_employee(
            &principal(Role::Admin),
            employee_invitation(company.id, PortalType::Normal),
        )
        .await
        .expect("invite");
    let token = last_token(&harness.mailer, EmailTemplate::EmployeeInvitation);
    harness
        .service
        .register(registration(token.clone()))
        .await
        .expect("first registration");

    let err = harness
        .service
        .verify(&token)
        .await
        .expect_err("consumed");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.detail_code(), Some("token_consumed"));
}

#[rstest]
#[tokio::test]
async fn expired_invitations_are_rejected(harness: Harness) {
    let company = seed_company(&harness.store).await;
    harness
        .service
        .invite_employee(
            &principal(Role::Admin),
            employee_invitation(company.id, PortalType::Normal),
        )
        .await
        .expect("invite");
    let token = last_token(&harness.mailer, EmailTemplate::EmployeeInvitation);

    harness.clock.advance(Duration::hours(73));

    let err = harness
        .service
        .register(registration(token))
        .await
        .expect_err("expired");
    assert_eq!(err.detail_code(), Some("token_expired"));
}

#[rstest]
#[tokio::test]
async fn brokers_invite_customers_for_themselves(harness: Harness) {
    let record = seed_broker(&harness.store).await;
    let inviter = broker(record.id);
    let invite = harness
        .service
        .invite_customer(
            &inviter,
            CustomerInvitation {
                email: EmailAddress::new("kim@kunde.de").expect("email"),
                first_name: Some("Kim".into()),
                last_name: None,
                broker_id: Some(BrokerId::random()),
            },
        )
        .await
        .expect("invite");
    assert_eq!(invite.broker_id, record.id);

    let pending = harness
        .service
        .pending_customer_invites(&inviter)
        .await
        .expect("pending");
    assert_eq!(pending.len(), 1);

    let token = last_token(&harness.mailer, EmailTemplate::CustomerInvitation);
    let customer = harness
        .service
        .register(registration(token))
        .await
        .expect("register");
    assert_eq!(customer.permission, Permission::Customer);
    assert_eq!(customer.profile.broker_id, Some(record.id));

    let pending = harness
        .service
        .pending_customer_invites(&inviter)
        .await
        .expect("pending");
    assert!(pending.is_empty());
}

#[rstest]
#[tokio::test]
async fn admins_must_name_the_broker(harness: Harness) {
    let err = harness
        .service
        .invite_customer(
            &principal(Role::Admin),
            CustomerInvitation {
                email: EmailAddress::new("kim@kunde.de").expect("email"),
                first_name: None,
                last_name: None,
                broker_id: None,
            },
        )
        .await
        .expect_err("missing broker");
    assert_eq!(err.detail_code(), Some("missing_broker"));
}

#[rstest]
#[tokio::test]
async fn broker_registration_links_the_record(harness: Harness) {
    let record = seed_broker(&harness.store).await;
    harness
        .service
        .invite_broker(&principal(Role::Admin), &record)
        .await
        .expect("invite");
    let token = last_token(&harness.mailer, EmailTemplate::BrokerInvitation);

    let preview = harness.service.verify(&token).await.expect("verify");
    assert_eq!(preview.first_name.as_deref(), Some("Max"));

    let account = harness
        .service
        .register(registration(token))
        .await
        .expect("register");
    assert_eq!(account.permission, Permission::Broker);

    let linked = harness
        .store
        .find_broker(&record.id)
        .await
        .expect("find")
        .expect("broker");
    assert_eq!(linked.user_id, Some(account.profile.id));
}

#[rstest]
#[tokio::test]
async fn existing_accounts_cannot_be_invited(harness: Harness) {
    let company = seed_company(&harness.store).await;
    let admin = principal(Role::Admin);
    harness
        .store
        .insert(&admin.profile, "hash")
        .await
        .expect("seed admin");

    let mut request = employee_invitation(company.id, PortalType::Normal);
    request.email = admin.profile.email.clone();
    let err = harness
        .service
        .invite_employee(&admin, request)
        .await
        .expect_err("taken");
    assert_eq!(err.detail_code(), Some("email_taken"));
}

#[rstest]
#[tokio::test]
async fn customers_cannot_invite(harness: Harness) {
    let record = seed_broker(&harness.store).await;
    let err = harness
        .service
        .invite_customer(
            &crate::domain::test_support::customer(record.id),
            CustomerInvitation {
                email: EmailAddress::new("freund@kunde.de").expect("email"),
                first_name: None,
                last_name: None,
                broker_id: None,
            },
        )
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn invitation_mail_failure_is_reported() {
    let store = Arc::new(MemoryStore::new());
    let company = seed_company(&store).await;
    let mut mailer = MockMailer::new();
    mailer
        .expect_send()
        .return_once(|_| Err(MailerError::transport("connection reset")));
    let service = build(
        store,
        Arc::new(mailer),
        Arc::new(MutableClock::new(fixed_now())),
    );

    let err = service
        .invite_employee(
            &principal(Role::Admin),
            employee_invitation(company.id, PortalType::Normal),
        )
        .await
        .expect_err("mail failure");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn bootstrap_admin_runs_once(harness: Harness) {
    let email = EmailAddress::new("admin@portal.example").expect("email");
    let password = NewPassword::new("sommer2024!").expect("password");

    let created = harness
        .service
        .bootstrap_admin(&email, &password)
        .await
        .expect("bootstrap");
    let again = harness
        .service
        .bootstrap_admin(&email, &password)
        .await
        .expect("second bootstrap");

    assert!(created);
    assert!(!again);
    let stored = harness
        .store
        .find_by_email(&email)
        .await
        .expect("lookup")
        .expect("admin stored");
    assert_eq!(stored.role, Role::Admin);
    assert!(harness.mailer.sent().is_empty());
}
