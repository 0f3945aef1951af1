//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven adapters (PostgreSQL, the in-memory store, file storage, the mail
//! provider, the password hasher) implement these traits. Each port exposes
//! a typed error so services map failures predictably.

mod macros;
pub(crate) use macros::define_port_error;

mod catalogue_repository;
mod content_repository;
mod file_storage;
mod invite_repository;
mod mailer;
mod order_repository;
mod organisation_repository;
mod password_hasher;
mod repository_error;
mod settings_repository;
mod ticket_repository;
mod user_repository;

pub use catalogue_repository::CatalogueRepository;
#[cfg(test)]
pub use catalogue_repository::MockCatalogueRepository;
pub use content_repository::ContentRepository;
#[cfg(test)]
pub use content_repository::MockContentRepository;
pub use file_storage::{FileStorage, FileStorageError};
#[cfg(test)]
pub use file_storage::MockFileStorage;
pub use invite_repository::InviteRepository;
#[cfg(test)]
pub use invite_repository::MockInviteRepository;
pub use mailer::{EmailMessage, EmailTemplate, Mailer, MailerError};
#[cfg(test)]
pub use mailer::MockMailer;
pub use order_repository::{OrderRepository, OrderScope};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use organisation_repository::OrganisationRepository;
#[cfg(test)]
pub use organisation_repository::MockOrganisationRepository;
pub use password_hasher::{FixturePasswordHasher, PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use repository_error::{RepositoryError, map_repository_error};
pub use settings_repository::SettingsRepository;
#[cfg(test)]
pub use settings_repository::MockSettingsRepository;
pub use ticket_repository::TicketRepository;
#[cfg(test)]
pub use ticket_repository::MockTicketRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserFilter, UserRepository};
