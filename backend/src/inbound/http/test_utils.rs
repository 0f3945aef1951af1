//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{App, web};
use url::Url;

use crate::domain::ports::{FixturePasswordHasher, UserRepository};
use crate::domain::test_support::{MutableClock, fixed_now, profile};
use crate::domain::{PortalLinks, Role, UserProfile};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::{HttpState, HttpStatePorts, SharedInfrastructure};
use crate::outbound::memory::{MemoryFileStorage, MemoryStore, RecordingMailer};

/// Password every seeded test account uses.
pub const TEST_PASSWORD: &str = "sommer2024!";

/// Build a session middleware configured for tests.
///
/// Generates a fresh key per invocation and disables the `Secure` flag for
/// plain HTTP test requests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Memory-backed portal with handles on the adapters behind it.
pub struct TestPortal {
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub clock: Arc<MutableClock>,
    pub state: HttpState,
}

impl TestPortal {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingMailer::new());
        let clock = Arc::new(MutableClock::new(fixed_now()));
        let ports = HttpStatePorts::from_store(
            store.clone(),
            SharedInfrastructure {
                storage: Arc::new(MemoryFileStorage::new()),
                hasher: Arc::new(FixturePasswordHasher),
                mailer: mailer.clone(),
                clock: clock.clone(),
            },
        );
        let links = PortalLinks::new(Url::parse("https://portal.example/").expect("url"));
        Self {
            store,
            mailer,
            clock,
            state: HttpState::new(ports, links),
        }
    }

    /// Insert an account that can sign in with [`TEST_PASSWORD`].
    pub async fn seed(&self, account: UserProfile) -> UserProfile {
        self.store
            .insert(&account, &format!("fixture${TEST_PASSWORD}"))
            .await
            .expect("seed account");
        account
    }

    pub async fn seed_role(&self, role: Role) -> UserProfile {
        self.seed(profile(role)).await
    }

    /// App with the full API under `/api/v1`.
    pub fn app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .service(
                web::scope("/api/v1")
                    .wrap(test_session_middleware())
                    .configure(configure_api),
            )
    }
}

/// Session cookie from a response that established a session.
pub fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}
