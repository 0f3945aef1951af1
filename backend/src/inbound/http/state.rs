//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    CatalogueRepository, ContentRepository, FileStorage, InviteRepository, Mailer,
    OrderRepository, OrganisationRepository, PasswordHasher, SettingsRepository,
    TicketRepository, UserRepository,
};
use crate::domain::{
    AuthDeps, AuthService, CatalogueService, ContentService, OnboardingDeps, OnboardingService,
    OrderDeps, OrderService, OrganisationService, PortalLinks, SettingsService, TicketService,
    UploadService,
};

/// Parameter object bundling every port implementation the services need.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub invites: Arc<dyn InviteRepository>,
    pub organisations: Arc<dyn OrganisationRepository>,
    pub catalogue: Arc<dyn CatalogueRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub tickets: Arc<dyn TicketRepository>,
    pub content: Arc<dyn ContentRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub storage: Arc<dyn FileStorage>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
}

/// Infrastructure shared by every repository port of a single backend.
pub struct SharedInfrastructure {
    pub storage: Arc<dyn FileStorage>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
}

impl HttpStatePorts {
    /// Use one store for all document collections.
    pub fn from_store<S>(store: Arc<S>, infra: SharedInfrastructure) -> Self
    where
        S: UserRepository
            + InviteRepository
            + OrganisationRepository
            + CatalogueRepository
            + OrderRepository
            + TicketRepository
            + ContentRepository
            + SettingsRepository
            + 'static,
    {
        Self {
            users: store.clone(),
            invites: store.clone(),
            organisations: store.clone(),
            catalogue: store.clone(),
            orders: store.clone(),
            tickets: store.clone(),
            content: store.clone(),
            settings: store,
            storage: infra.storage,
            hasher: infra.hasher,
            mailer: infra.mailer,
            clock: infra.clock,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: AuthService,
    pub onboarding: OnboardingService,
    pub catalogue: CatalogueService,
    pub orders: OrderService,
    pub organisations: OrganisationService,
    pub tickets: TicketService,
    pub content: ContentService,
    pub uploads: UploadService,
    pub settings: SettingsService,
}

impl HttpState {
    /// Wire the domain services over the given ports.
    pub fn new(ports: HttpStatePorts, links: PortalLinks) -> Self {
        let settings = SettingsService::new(ports.settings.clone());
        let catalogue = CatalogueService::new(ports.catalogue.clone(), ports.clock.clone());
        let auth = AuthService::new(
            AuthDeps {
                users: ports.users.clone(),
                invites: ports.invites.clone(),
                hasher: ports.hasher.clone(),
                mailer: ports.mailer.clone(),
                clock: ports.clock.clone(),
            },
            settings.clone(),
            links.clone(),
        );
        let onboarding = OnboardingService::new(
            OnboardingDeps {
                users: ports.users.clone(),
                invites: ports.invites.clone(),
                organisations: ports.organisations.clone(),
                hasher: ports.hasher.clone(),
                mailer: ports.mailer.clone(),
                clock: ports.clock.clone(),
            },
            settings.clone(),
            links.clone(),
        );
        let orders = OrderService::new(
            OrderDeps {
                orders: ports.orders.clone(),
                users: ports.users.clone(),
                mailer: ports.mailer.clone(),
                clock: ports.clock.clone(),
            },
            catalogue.clone(),
            links,
        );
        let organisations = OrganisationService::new(
            ports.organisations.clone(),
            ports.users.clone(),
            ports.clock.clone(),
        );
        Self {
            auth,
            onboarding,
            catalogue,
            orders,
            organisations,
            tickets: TicketService::new(ports.tickets.clone(), ports.clock.clone()),
            content: ContentService::new(ports.content.clone(), ports.clock.clone()),
            uploads: UploadService::new(ports.storage.clone()),
            settings,
        }
    }
}
