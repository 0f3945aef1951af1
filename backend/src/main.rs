//! Backend entry-point: loads configuration, wires adapters and serves the
//! portal API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use fleet_backend::inbound::http::health::HealthState;
use fleet_backend::inbound::http::session_config::fingerprint::key_fingerprint;
use fleet_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use server::{PortalConfig, ServerConfig, build_http_state, create_server, seed_bootstrap_admin};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = PortalConfig::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session signing key loaded"
    );

    let http_state = build_http_state(&config).await?;
    seed_bootstrap_admin(&http_state, &config).await?;

    let bind_addr = config.bind_addr()?;
    let server_config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
        http_state,
    );
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, server_config)?;
    info!(%bind_addr, "portal listening");
    server.await?;
    Ok(())
}
