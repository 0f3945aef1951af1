//! PostgreSQL adapters built on Diesel, `diesel-async` and `bb8`.
//!
//! Repositories only translate between row structs and domain documents.
//! `models` and `schema` stay private to this module; every failure leaves
//! as a [`RepositoryError`](crate::domain::ports::RepositoryError).
//!
//! ```no_run
//! use fleet_backend::outbound::persistence::{
//!     DbPool, DieselUserRepository, PoolConfig, run_migrations,
//! };
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://portal@localhost/portal";
//! run_migrations(url)?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let users = DieselUserRepository::new(pool);
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_catalogue_repository;
mod diesel_content_repository;
mod diesel_invite_repository;
mod diesel_order_repository;
mod diesel_organisation_repository;
mod diesel_settings_repository;
mod diesel_ticket_repository;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_catalogue_repository::DieselCatalogueRepository;
pub use diesel_content_repository::DieselContentRepository;
pub use diesel_invite_repository::DieselInviteRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_organisation_repository::DieselOrganisationRepository;
pub use diesel_settings_repository::DieselSettingsRepository;
pub use diesel_ticket_repository::DieselTicketRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::run_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};
