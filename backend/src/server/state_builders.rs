//! Builders wiring configured adapters into the HTTP state.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr, eyre};
use tracing::{info, warn};

use fleet_backend::domain::PortalLinks;
use fleet_backend::domain::ports::{FileStorage, Mailer, PasswordHasher};
use fleet_backend::inbound::http::state::{HttpState, HttpStatePorts, SharedInfrastructure};
use fleet_backend::outbound::mail::{
    BREVO_SMTP_ENDPOINT, BrevoMailer, BrevoSettings, LoggingMailer,
};
use fleet_backend::outbound::memory::MemoryStore;
use fleet_backend::outbound::persistence::{
    DbPool, DieselCatalogueRepository, DieselContentRepository, DieselInviteRepository,
    DieselOrderRepository, DieselOrganisationRepository, DieselSettingsRepository,
    DieselTicketRepository, DieselUserRepository, PoolConfig, run_migrations,
};
use fleet_backend::outbound::security::Argon2PasswordHasher;
use fleet_backend::outbound::storage::LocalFileStorage;

use super::config::PortalConfig;

const MAIL_TIMEOUT: Duration = Duration::from_secs(10);

fn diesel_ports(pool: &DbPool, infra: SharedInfrastructure) -> HttpStatePorts {
    HttpStatePorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        invites: Arc::new(DieselInviteRepository::new(pool.clone())),
        organisations: Arc::new(DieselOrganisationRepository::new(pool.clone())),
        catalogue: Arc::new(DieselCatalogueRepository::new(pool.clone())),
        orders: Arc::new(DieselOrderRepository::new(pool.clone())),
        tickets: Arc::new(DieselTicketRepository::new(pool.clone())),
        content: Arc::new(DieselContentRepository::new(pool.clone())),
        settings: Arc::new(DieselSettingsRepository::new(pool.clone())),
        storage: infra.storage,
        hasher: infra.hasher,
        mailer: infra.mailer,
        clock: infra.clock,
    }
}

fn build_mailer(config: &PortalConfig) -> Result<Arc<dyn Mailer>> {
    match config.mail()? {
        Some(mail) => {
            let endpoint = BREVO_SMTP_ENDPOINT
                .parse()
                .wrap_err("invalid Brevo endpoint")?;
            let mailer = BrevoMailer::new(
                endpoint,
                MAIL_TIMEOUT,
                BrevoSettings {
                    api_key: mail.api_key,
                    sender_email: mail.sender_email,
                    sender_name: mail.sender_name,
                    templates: mail.templates,
                },
            )
            .wrap_err("failed to build Brevo client")?;
            info!("transactional e-mail via Brevo");
            Ok(Arc::new(mailer))
        }
        None => {
            warn!("no Brevo API key configured; e-mails are only logged");
            Ok(Arc::new(LoggingMailer))
        }
    }
}

/// Build the HTTP state from configuration.
///
/// Uses PostgreSQL when `database_url` is set, running pending migrations
/// first. Without it every collection lives in memory and is lost on
/// restart.
pub async fn build_http_state(config: &PortalConfig) -> Result<HttpState> {
    let storage_dir = config.storage_dir();
    let storage: Arc<dyn FileStorage> = Arc::new(
        LocalFileStorage::open(&storage_dir)
            .wrap_err_with(|| format!("failed to open storage at {}", storage_dir.display()))?,
    );
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    let infra = SharedInfrastructure {
        storage,
        hasher,
        mailer: build_mailer(config)?,
        clock: Arc::new(mockable::DefaultClock),
    };

    let ports = match config.database_url.as_deref() {
        Some(url) => {
            let migration_url = url.to_owned();
            tokio::task::spawn_blocking(move || run_migrations(&migration_url))
                .await
                .map_err(|err| eyre!("migration task failed: {err}"))?
                .wrap_err("failed to run database migrations")?;
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .wrap_err("failed to build database pool")?;
            info!("using PostgreSQL persistence");
            diesel_ports(&pool, infra)
        }
        None => {
            warn!("no database_url configured; using the in-memory store");
            HttpStatePorts::from_store(Arc::new(MemoryStore::new()), infra)
        }
    };

    Ok(HttpState::new(ports, PortalLinks::new(config.public_base_url()?)))
}

/// Create the configured administrator when no account holds its address.
pub async fn seed_bootstrap_admin(state: &HttpState, config: &PortalConfig) -> Result<()> {
    let Some((email, password)) = config.bootstrap_admin()? else {
        return Ok(());
    };
    let created = state
        .onboarding
        .bootstrap_admin(&email, &password)
        .await
        .wrap_err("failed to create bootstrap administrator")?;
    if !created {
        info!("bootstrap administrator already present");
    }
    Ok(())
}
